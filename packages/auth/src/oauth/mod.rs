// ABOUTME: Social login clients for Kakao and Google
// ABOUTME: Common client trait, HTTP client construction, and provider response types

pub mod google;
pub mod kakao;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use laundrylens_core::SocialProvider;
use reqwest::Client;

use crate::error::AuthResult;

pub use google::GoogleClient;
pub use kakao::KakaoClient;
pub use types::{OAuthUser, ProviderTokenResponse};

/// Authorization-code login against one social provider
#[async_trait]
pub trait SocialLoginClient: Send + Sync {
    fn provider(&self) -> SocialProvider;

    /// Consent page the browser is redirected to
    fn authorization_url(&self) -> AuthResult<String>;

    /// Exchange an authorization code and load the member's profile
    async fn authenticate(&self, code: &str) -> AuthResult<OAuthUser>;

    /// Disconnect this app from the member's provider account
    async fn disconnect(&self, access_token: &str) -> AuthResult<()>;
}

/// HTTP client used for provider calls
pub(crate) fn create_client() -> AuthResult<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(5))
        .build()?)
}

pub(crate) fn trim_base(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}

/// Provider nickname, or the localized fallback when it is blank
pub(crate) fn nickname_or(nickname: Option<String>, fallback_prefix: &str, id: &str) -> String {
    nickname
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("{}{}", fallback_prefix, id))
}
