// ABOUTME: Tests for the assembled application and maintenance commands
// ABOUTME: Checks CORS preflight handling, the health route, and catalog seeding

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use laundrylens_cli::{build_app, run_seed};
use laundrylens_config::Config;
use laundrylens_storage::connect_in_memory;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

const FRONTEND: &str = "http://localhost:5173";

fn test_config() -> Config {
    Config::from_lookup(|name| match name {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "JWT_SECRET" => Some("cli-test-secret".to_string()),
        "FRONTEND_URL" => Some(FRONTEND.to_string()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn test_health_through_all_layers() {
    let config = test_config();
    let app = build_app(connect_in_memory().await.unwrap(), &config).unwrap();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend() {
    let config = test_config();
    let app = build_app(connect_in_memory().await.unwrap(), &config).unwrap();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/analyze")
        .header(header::ORIGIN, FRONTEND)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-guest-id")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        FRONTEND
    );
}

#[tokio::test]
async fn test_seed_command() {
    let report = run_seed(&test_config()).await.unwrap();
    assert_eq!(report.symbols, 22);
    assert!(report.materials > 0);
}
