// ABOUTME: HTTP request handlers for the textile material catalog
// ABOUTME: Listing with optional search and detail lookups with linked care symbols

use axum::extract::{Path, Query, State};
use laundrylens_catalog::{MaterialDetail, MaterialList};
use serde::Deserialize;

use crate::error::AppError;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MaterialListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MaterialSearchQuery {
    pub q: Option<String>,
}

pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialListQuery>,
) -> ApiResult<MaterialList> {
    let materials = state.materials.find_all(query.search.as_deref()).await?;
    Ok(ApiResponse::success(materials))
}

pub async fn search_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialSearchQuery>,
) -> ApiResult<MaterialList> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("q is required".to_string()))?;

    let materials = state.materials.search(term).await?;
    Ok(ApiResponse::success(materials))
}

pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MaterialDetail> {
    Ok(ApiResponse::success(state.materials.find_by_id(&id).await?))
}

pub async fn get_material_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<MaterialDetail> {
    Ok(ApiResponse::success(state.materials.find_by_code(&code).await?))
}
