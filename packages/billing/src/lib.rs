// ABOUTME: Billing for LaundryLens: daily quotas, subscriptions, and Toss payments
// ABOUTME: Decides whether an identity may run another analysis and records what it spent

pub mod error;
pub mod payment;
pub mod subscription;
pub mod usage;

pub use error::{BillingError, BillingResult};
pub use payment::{
    CancelPaymentInput, ConfirmPaymentInput, CreatePaymentInput, Payment, PaymentList, PaymentService,
    PaymentStorage, TossClient, TossPayment,
};
pub use subscription::{
    Allowance, CreditUsage, Subscription, SubscriptionList, SubscriptionService,
    SubscriptionStatusView, SubscriptionStorage, UsageSummary,
};
pub use usage::UsageLogStorage;
