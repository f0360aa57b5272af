// ABOUTME: Errors raised by the analyze flow
// ABOUTME: Quota denials plus wrapped vision, billing, and storage failures

use laundrylens_billing::BillingError;
use laundrylens_storage::StorageError;
use thiserror::Error;

use crate::vision::AIServiceError;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("{0}")]
    QuotaExceeded(String),

    #[error("Vision service error: {0}")]
    Vision(#[from] AIServiceError),

    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type AnalyzeServiceResult<T> = Result<T, AnalyzeError>;
