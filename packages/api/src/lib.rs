// ABOUTME: HTTP API layer for LaundryLens providing REST endpoints and routing
// ABOUTME: Integration layer that depends on all domain packages

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use laundrylens_core::constants::MAX_IMAGE_BYTES;

pub mod analyze_handlers;
pub mod auth_handlers;
pub mod error;
pub mod extractors;
pub mod health;
pub mod materials_handlers;
pub mod payment_handlers;
pub mod response;
pub mod state;
pub mod subscription_handlers;
pub mod symbols_handlers;

pub use error::AppError;
pub use extractors::{AnalysisIdentity, CurrentUser, OptionalUser, GUEST_ID_HEADER};
pub use response::{ApiResponse, ApiResult};
pub use state::{AppState, StateError};

/// Room for multipart framing around the largest accepted image
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Creates the social login and session router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/kakao", get(auth_handlers::kakao_login))
        .route("/google", get(auth_handlers::google_login))
        .route("/{provider}/callback", get(auth_handlers::oauth_callback))
        .route("/{provider}/token", post(auth_handlers::oauth_token))
        .route("/refresh", post(auth_handlers::refresh_tokens))
        .route("/logout", post(auth_handlers::logout))
        .route("/account", delete(auth_handlers::delete_account))
        .route("/me", get(auth_handlers::me))
}

/// Creates the label analysis router
pub fn create_analyze_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(analyze_handlers::analyze).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/remaining", get(analyze_handlers::remaining))
        .route("/history", get(analyze_handlers::history))
}

/// Creates the symbols API router
pub fn create_symbols_router() -> Router<AppState> {
    Router::new()
        .route("/", get(symbols_handlers::list_symbols))
        .route("/countries", get(symbols_handlers::list_countries))
        .route("/code/{code}", get(symbols_handlers::get_symbol_by_code))
        .route(
            "/category/{category}",
            get(symbols_handlers::list_symbols_by_category),
        )
        .route("/{id}", get(symbols_handlers::get_symbol))
}

/// Creates the materials API router
pub fn create_materials_router() -> Router<AppState> {
    Router::new()
        .route("/", get(materials_handlers::list_materials))
        .route("/search", get(materials_handlers::search_materials))
        .route("/code/{code}", get(materials_handlers::get_material_by_code))
        .route("/{id}", get(materials_handlers::get_material))
}

/// Creates the subscription API router
pub fn create_subscription_router() -> Router<AppState> {
    Router::new()
        .route("/", delete(subscription_handlers::cancel))
        .route("/status", get(subscription_handlers::get_status))
        .route("/current", get(subscription_handlers::get_current))
        .route("/history", get(subscription_handlers::get_history))
}

/// Creates the payment API router
pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/prepare", post(payment_handlers::prepare))
        .route("/confirm", post(payment_handlers::confirm))
        .route("/history", get(payment_handlers::history))
        .route("/{id}", get(payment_handlers::get_payment))
        .route("/{id}/cancel", post(payment_handlers::cancel))
}

/// Full application router with state attached
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/auth", create_auth_router())
        .nest("/analyze", create_analyze_router())
        .nest("/symbols", create_symbols_router())
        .nest("/materials", create_materials_router())
        .nest("/subscription", create_subscription_router())
        .nest("/payment", create_payment_router())
        .with_state(state)
}
