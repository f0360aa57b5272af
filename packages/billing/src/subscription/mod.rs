pub mod service;
pub mod storage;
pub mod types;

pub use service::SubscriptionService;
pub use storage::SubscriptionStorage;
pub use types::{
    Allowance, CreditUsage, Subscription, SubscriptionList, SubscriptionStatusView, UsageSummary,
};
