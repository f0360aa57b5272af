// ABOUTME: HTTP request handlers for social login and member sessions
// ABOUTME: Provider redirects, code exchange, token refresh, logout, withdrawal, and profile

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use laundrylens_auth::TokenResponse;
use laundrylens_core::SocialProvider;
use laundrylens_users::User;
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::response::{ApiResponse, ApiResult, MessageResponse};
use crate::state::AppState;

/// Authorization code delivered by the provider
#[derive(Debug, Deserialize)]
pub struct OAuthCodeRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

fn parse_provider(raw: &str) -> Result<SocialProvider, AppError> {
    raw.parse::<SocialProvider>()
        .map_err(|_| AppError::NotFound(format!("Login provider '{}'", raw)))
}

fn require_code(code: &str) -> Result<&str, AppError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::Validation("code is required".to_string()));
    }
    Ok(code)
}

fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

fn login_redirect(state: &AppState, provider: SocialProvider) -> Result<Response, AppError> {
    info!("Redirecting to {} login", provider);
    let url = state.auth.authorization_url(provider)?;
    Ok(redirect(&url))
}

/// Redirect the browser to the Kakao consent page
pub async fn kakao_login(State(state): State<AppState>) -> Result<Response, AppError> {
    login_redirect(&state, SocialProvider::Kakao)
}

/// Redirect the browser to the Google consent page
pub async fn google_login(State(state): State<AppState>) -> Result<Response, AppError> {
    login_redirect(&state, SocialProvider::Google)
}

/// Frontend URL that receives a fresh session in its query string
pub(crate) fn frontend_callback_url(
    frontend_url: &str,
    tokens: &TokenResponse,
) -> Result<String, AppError> {
    let mut url = Url::parse(&format!(
        "{}/auth/callback",
        frontend_url.trim_end_matches('/')
    ))
        .map_err(|e| AppError::Configuration(format!("Invalid FRONTEND_URL: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("accessToken", &tokens.access_token)
        .append_pair("refreshToken", &tokens.refresh_token);
    Ok(url.into())
}

/// Provider redirect target: log the member in and hand the session to the frontend
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(request): Query<OAuthCodeRequest>,
) -> Result<Response, AppError> {
    let provider = parse_provider(&provider)?;
    let code = require_code(&request.code)?;
    info!("Handling {} login callback", provider);

    let tokens = state.auth.login(provider, code).await?;
    let location = frontend_callback_url(&state.frontend_url, &tokens)?;
    Ok(redirect(&location))
}

/// Exchange an authorization code obtained by the client for a session
pub async fn oauth_token(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    payload: Result<Json<OAuthCodeRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(request) = payload?;
    let provider = parse_provider(&provider)?;
    let code = require_code(&request.code)?;
    info!("Exchanging {} authorization code", provider);

    let tokens = state.auth.login(provider, code).await?;
    Ok(ApiResponse::success(tokens))
}

pub async fn refresh_tokens(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(request) = payload?;
    info!("Refreshing session");
    let tokens = state.auth.refresh_tokens(request.refresh_token.trim()).await?;
    Ok(ApiResponse::success(tokens))
}

/// Sessions are stateless; the client drops its tokens
pub async fn logout(CurrentUser(user): CurrentUser) -> ApiResult<MessageResponse> {
    info!(user_id = %user.id, "Member logged out");
    Ok(ApiResponse::success(MessageResponse::new("로그아웃되었습니다.")))
}

pub async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<MessageResponse> {
    state.auth.delete_account(&user.id).await?;
    Ok(ApiResponse::success(MessageResponse::new(
        "회원 탈퇴가 완료되었습니다.",
    )))
}

pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use laundrylens_auth::UserSummary;

    #[test]
    fn test_frontend_callback_url() {
        let tokens = TokenResponse {
            access_token: "aaa.bbb.ccc".to_string(),
            refresh_token: "ddd.eee.fff".to_string(),
            user: UserSummary {
                id: "u1".to_string(),
                email: None,
                nickname: "n".to_string(),
                profile_image: None,
                is_premium: false,
            },
        };

        let url = frontend_callback_url("http://localhost:5173", &tokens).unwrap();
        assert_eq!(
            url,
            "http://localhost:5173/auth/callback?accessToken=aaa.bbb.ccc&refreshToken=ddd.eee.fff"
        );

        let url = frontend_callback_url("https://laundrylens.app/", &tokens).unwrap();
        assert!(url.starts_with("https://laundrylens.app/auth/callback?"));
    }

    #[test]
    fn test_unknown_provider() {
        assert!(matches!(parse_provider("naver"), Err(AppError::NotFound(_))));
        assert_eq!(parse_provider("kakao").unwrap(), SocialProvider::Kakao);
    }
}
