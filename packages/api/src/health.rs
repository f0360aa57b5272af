// ABOUTME: Liveness endpoint
// ABOUTME: Reports service name, version, and current time

use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "laundrylens"
    }))
}
