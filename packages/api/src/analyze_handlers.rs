// ABOUTME: HTTP request handlers for label photo analysis
// ABOUTME: Multipart image upload, remaining quota, and member analysis history

use axum::extract::{Multipart, State};
use laundrylens_ai::{AnalyzeResult, HistoryList};
use laundrylens_billing::UsageSummary;
use laundrylens_core::constants::MAX_IMAGE_BYTES;
use tracing::info;

use crate::error::AppError;
use crate::extractors::{AnalysisIdentity, CurrentUser};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Multipart field holding the label photo
const IMAGE_FIELD: &str = "image";

/// Uploaded label photo
#[derive(Debug)]
pub(crate) struct ImageUpload {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Check an uploaded file against the accepted image types and size
pub(crate) fn validate_image(content_type: Option<&str>, data: Vec<u8>) -> Result<ImageUpload, AppError> {
    let content_type = content_type
        .map(|c| c.trim().to_ascii_lowercase())
        .unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(AppError::Validation(
            "Only image files can be uploaded".to_string(),
        ));
    }
    if data.is_empty() {
        return Err(AppError::Validation("Image file is empty".to_string()));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation(format!(
            "Image must be at most {} MB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    Ok(ImageUpload { content_type, data })
}

async fn read_image(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Read error: {}", e)))?
            .to_vec();
        return validate_image(content_type.as_deref(), data);
    }

    Err(AppError::Validation("An image file is required".to_string()))
}

pub async fn analyze(
    State(state): State<AppState>,
    AnalysisIdentity(identity): AnalysisIdentity,
    multipart: Multipart,
) -> ApiResult<AnalyzeResult> {
    let image = read_image(multipart).await?;
    info!(
        "Analyzing {} byte {} upload for {}",
        image.data.len(),
        image.content_type,
        identity
    );

    let result = state
        .analyze
        .analyze_image(&image.data, &image.content_type, &identity)
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn remaining(
    State(state): State<AppState>,
    AnalysisIdentity(identity): AnalysisIdentity,
) -> ApiResult<UsageSummary> {
    let summary = state.analyze.remaining_analyses(&identity).await?;
    Ok(ApiResponse::success(summary))
}

pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<HistoryList> {
    info!(user_id = %user.id, "Listing analysis history");
    let history = state.analyze.history(&user.id).await?;
    Ok(ApiResponse::success(history))
}
