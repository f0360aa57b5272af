// ABOUTME: Application error type returned by every handler
// ABOUTME: Maps domain errors to HTTP status codes, machine-readable codes, and sanitized messages

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use laundrylens_ai::{AIServiceError, AnalyzeError};
use laundrylens_auth::AuthError;
use laundrylens_billing::BillingError;
use laundrylens_catalog::CatalogError;
use laundrylens_storage::StorageError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Authentication error")]
    Auth(#[from] AuthError),

    #[error("Billing error")]
    Billing(#[from] BillingError),

    #[error("Catalog error")]
    Catalog(#[from] CatalogError),

    #[error("Analyze error")]
    Analyze(#[from] AnalyzeError),

    #[error("Storage error")]
    Storage(#[from] StorageError),
}

/// Malformed or missing JSON bodies use the same envelope as every other failure
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Structured error response format for API consistency
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
    request_id: String,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl AppError {
    pub fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Auth(e) => auth_status(e),
            AppError::Billing(e) => billing_status(e),
            AppError::Catalog(e) => match e {
                CatalogError::SymbolNotFound => (StatusCode::NOT_FOUND, "SYMBOL_NOT_FOUND"),
                CatalogError::MaterialNotFound => (StatusCode::NOT_FOUND, "MATERIAL_NOT_FOUND"),
                CatalogError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                CatalogError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            },
            AppError::Analyze(e) => match e {
                AnalyzeError::QuotaExceeded(_) => (StatusCode::FORBIDDEN, "QUOTA_EXCEEDED"),
                AnalyzeError::Vision(AIServiceError::NoApiKey) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
                }
                AnalyzeError::Vision(_) => (StatusCode::BAD_GATEWAY, "ANALYSIS_FAILED"),
                AnalyzeError::Billing(inner) => billing_status(inner),
                AnalyzeError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            },
            AppError::Storage(StorageError::NotFound) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        }
    }

    /// Get user-friendly error message (sanitized for external consumption)
    pub fn to_user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::Configuration(_) => "Server configuration error".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            AppError::Auth(e) => match e {
                AuthError::Unauthorized(msg) => msg.clone(),
                AuthError::InvalidToken(_) => "Invalid or expired token".to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::Provider(_) | AuthError::Http(_) | AuthError::Json(_) => {
                    "Social login provider request failed".to_string()
                }
                AuthError::Configuration(_) => "Social login is not configured".to_string(),
                AuthError::Signing(_) | AuthError::Storage(_) => {
                    "An internal server error occurred".to_string()
                }
            },
            AppError::Billing(e) => billing_message(e),
            AppError::Catalog(e) => match e {
                CatalogError::Storage(_) => "Data storage error".to_string(),
                other => other.to_string(),
            },
            AppError::Analyze(e) => match e {
                AnalyzeError::QuotaExceeded(msg) => msg.clone(),
                AnalyzeError::Vision(AIServiceError::NoApiKey) => {
                    "Image analysis is not configured".to_string()
                }
                AnalyzeError::Vision(_) => "Image analysis failed".to_string(),
                AnalyzeError::Billing(inner) => billing_message(inner),
                AnalyzeError::Storage(_) => "Data storage error".to_string(),
            },
            AppError::Storage(StorageError::NotFound) => {
                "The requested resource was not found".to_string()
            }
            AppError::Storage(_) => "Data storage error".to_string(),
        }
    }
}

fn auth_status(e: &AuthError) -> (StatusCode, &'static str) {
    match e {
        AuthError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        AuthError::Provider(_) | AuthError::Http(_) | AuthError::Json(_) => {
            (StatusCode::BAD_GATEWAY, "OAUTH_PROVIDER_ERROR")
        }
        AuthError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
        AuthError::Signing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        AuthError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    }
}

fn billing_status(e: &BillingError) -> (StatusCode, &'static str) {
    match e {
        BillingError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        BillingError::SubscriptionNotFound => (StatusCode::NOT_FOUND, "SUBSCRIPTION_NOT_FOUND"),
        BillingError::NoActiveSubscription => (StatusCode::BAD_REQUEST, "NO_ACTIVE_SUBSCRIPTION"),
        BillingError::InsufficientCredits => (StatusCode::BAD_REQUEST, "INSUFFICIENT_CREDITS"),
        BillingError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        BillingError::PaymentNotFound => (StatusCode::NOT_FOUND, "PAYMENT_NOT_FOUND"),
        BillingError::AmountMismatch => (StatusCode::BAD_REQUEST, "AMOUNT_MISMATCH"),
        BillingError::AlreadyCompleted => (StatusCode::CONFLICT, "PAYMENT_ALREADY_COMPLETED"),
        BillingError::InvalidPaymentState(_) => (StatusCode::BAD_REQUEST, "INVALID_PAYMENT_STATE"),
        BillingError::Gateway(_) => (StatusCode::BAD_REQUEST, "PAYMENT_FAILED"),
        BillingError::GatewayNotConfigured => {
            (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
        }
        BillingError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        BillingError::Http(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

fn billing_message(e: &BillingError) -> String {
    match e {
        BillingError::InvalidAmount(_) => "Amount must be at least 1".to_string(),
        BillingError::InvalidPaymentState(reason) => format!("Invalid payment state: {}", reason),
        // Toss messages are written for end users
        BillingError::Gateway(message) => message.clone(),
        BillingError::GatewayNotConfigured => "Payments are not configured".to_string(),
        BillingError::Storage(_) => "Data storage error".to_string(),
        BillingError::Http(_) => "An internal server error occurred".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.to_status_and_code();
        let user_message = self.to_user_message();

        // Log internal errors with full context but don't expose details
        if status_code.is_server_error() {
            error!(
                request_id = %request_id,
                error_code = %error_code,
                error = %self,
                source = ?std::error::Error::source(&self),
                "Request failed"
            );
        } else if status_code == StatusCode::BAD_GATEWAY {
            warn!(request_id = %request_id, error = %self, "Upstream request failed");
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: error_code.to_string(),
                message: user_message,
            },
            request_id,
        };

        (status_code, Json(body)).into_response()
    }
}
