// ABOUTME: HTTP request handlers for the laundry symbol catalog
// ABOUTME: Listing by category, localized lookups by id or code, and supported languages

use axum::extract::{Path, Query, State};
use laundrylens_catalog::{CountryList, SymbolDetail, SymbolList};
use laundrylens_core::SymbolCategory;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SymbolListQuery {
    pub category: Option<String>,
}

/// Display language for symbol texts (`ko`, `en`, `jp`)
#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

fn parse_category(raw: &str) -> Result<SymbolCategory, AppError> {
    raw.parse::<SymbolCategory>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

pub async fn list_symbols(
    State(state): State<AppState>,
    Query(query): Query<SymbolListQuery>,
) -> ApiResult<SymbolList> {
    let category = match query.category.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(raw) => Some(parse_category(raw)?),
    };

    let symbols = state.symbols.find_all(category).await?;
    Ok(ApiResponse::success(symbols))
}

pub async fn list_countries(State(state): State<AppState>) -> ApiResult<CountryList> {
    Ok(ApiResponse::success(state.symbols.supported_countries()))
}

pub async fn get_symbol(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> ApiResult<SymbolDetail> {
    let symbol = state.symbols.find_by_id(&id, query.lang.as_deref()).await?;
    Ok(ApiResponse::success(symbol))
}

pub async fn get_symbol_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> ApiResult<SymbolDetail> {
    let symbol = state
        .symbols
        .find_by_code(&code, query.lang.as_deref())
        .await?;
    Ok(ApiResponse::success(symbol))
}

pub async fn list_symbols_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> ApiResult<Vec<SymbolDetail>> {
    let category = parse_category(&category)?;
    info!("Listing {} symbols", category);

    let symbols = state
        .symbols
        .find_by_category(category, query.lang.as_deref())
        .await?;
    Ok(ApiResponse::success(symbols))
}
