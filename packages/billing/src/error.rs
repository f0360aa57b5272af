// ABOUTME: Error types for quota, subscription, and payment operations
// ABOUTME: Wraps storage and HTTP failures alongside business rule violations

use laundrylens_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("User not found")]
    UserNotFound,

    #[error("Subscription not found")]
    SubscriptionNotFound,

    #[error("No active subscription")]
    NoActiveSubscription,

    #[error("Insufficient credits")]
    InsufficientCredits,

    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Payment amount does not match the order")]
    AmountMismatch,

    #[error("Payment already completed")]
    AlreadyCompleted,

    #[error("Invalid payment state: {0}")]
    InvalidPaymentState(String),

    #[error("Payment gateway rejected the request: {0}")]
    Gateway(String),

    #[error("Payment gateway is not configured")]
    GatewayNotConfigured,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<sqlx::Error> for BillingError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(StorageError::Sqlx(err))
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
