// ABOUTME: Shared API response types
// ABOUTME: Provides the success envelope returned by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        ResponseJson(self).into_response()
    }
}

/// Result type returned by handlers
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Wrap data in a success envelope with a non-200 status
pub fn with_status<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, ResponseJson(ApiResponse::success(data))).into_response()
}

/// Plain `{message}` payload for endpoints without a resource to return
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
