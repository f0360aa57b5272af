// ABOUTME: Kakao Login client
// ABOUTME: Builds the consent URL, exchanges codes, loads profiles, and unlinks the app

use async_trait::async_trait;
use laundrylens_config::OAuthClientConfig;
use laundrylens_core::SocialProvider;
use reqwest::Client;
use tracing::{debug, error, info};
use url::Url;

use crate::error::{AuthError, AuthResult};
use crate::oauth::types::{KakaoUserResponse, OAuthUser, ProviderTokenResponse};
use crate::oauth::{create_client, nickname_or, trim_base, SocialLoginClient};

pub const KAKAO_AUTH_BASE_URL: &str = "https://kauth.kakao.com";
pub const KAKAO_API_BASE_URL: &str = "https://kapi.kakao.com";

const KAKAO_SCOPES: &str = "profile_nickname profile_image account_email";
const NICKNAME_FALLBACK: &str = "카카오유저";

pub struct KakaoClient {
    client: Client,
    config: OAuthClientConfig,
    auth_base: String,
    api_base: String,
}

impl KakaoClient {
    pub fn new(config: OAuthClientConfig) -> AuthResult<Self> {
        Ok(Self {
            client: create_client()?,
            config,
            auth_base: KAKAO_AUTH_BASE_URL.to_string(),
            api_base: KAKAO_API_BASE_URL.to_string(),
        })
    }

    /// Point the client at other hosts (kauth for tokens, kapi for the user API)
    pub fn with_base_urls(mut self, auth_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.auth_base = trim_base(auth_base);
        self.api_base = trim_base(api_base);
        self
    }

    pub fn authorization_url(&self) -> AuthResult<String> {
        if !self.config.is_configured() {
            return Err(AuthError::Configuration(
                "Kakao login is not configured".to_string(),
            ));
        }

        let mut url = Url::parse(&format!("{}/oauth/authorize", self.auth_base))
            .map_err(|e| AuthError::Configuration(format!("Invalid Kakao auth URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", KAKAO_SCOPES);

        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> AuthResult<ProviderTokenResponse> {
        debug!("Exchanging Kakao authorization code");

        let response = self
            .client
            .post(format!("{}/oauth/token", self.auth_base))
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("code", code),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            // Provider bodies can echo the code; log status only
            error!("Kakao token exchange failed with status {}", status);
            return Err(AuthError::Unauthorized(
                "Failed to obtain a Kakao token".to_string(),
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn fetch_profile(&self, access_token: &str) -> AuthResult<KakaoUserResponse> {
        let response = self
            .client
            .get(format!("{}/v2/user/me", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            error!("Kakao profile request failed with status {}", response.status());
            return Err(AuthError::Unauthorized(
                "Failed to load the Kakao profile".to_string(),
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn unlink(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(format!("{}/v1/user/unlink", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "Kakao unlink failed with status {}",
                response.status()
            )));
        }

        info!("Unlinked Kakao account");
        Ok(())
    }
}

#[async_trait]
impl SocialLoginClient for KakaoClient {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Kakao
    }

    fn authorization_url(&self) -> AuthResult<String> {
        KakaoClient::authorization_url(self)
    }

    async fn authenticate(&self, code: &str) -> AuthResult<OAuthUser> {
        let tokens = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&tokens.access_token).await?;

        let provider_id = profile.id.to_string();
        let account = profile.kakao_account.unwrap_or_default();
        let kakao_profile = account.profile.unwrap_or_default();

        Ok(OAuthUser {
            provider: SocialProvider::Kakao,
            nickname: nickname_or(kakao_profile.nickname, NICKNAME_FALLBACK, &provider_id),
            provider_id,
            email: account.email,
            profile_image: kakao_profile.profile_image_url,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    async fn disconnect(&self, access_token: &str) -> AuthResult<()> {
        self.unlink(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthClientConfig {
        OAuthClientConfig {
            client_id: "kakao-client".to_string(),
            client_secret: "kakao-secret".to_string(),
            callback_url: "http://localhost:3000/auth/kakao/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url() {
        let client = KakaoClient::new(config()).unwrap();
        let url = Url::parse(&client.authorization_url().unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("kauth.kakao.com"));
        assert_eq!(url.path(), "/oauth/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".into(), "kakao-client".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:3000/auth/kakao/callback".into()
        )));
        assert!(pairs.contains(&("scope".into(), KAKAO_SCOPES.into())));
    }

    #[test]
    fn test_authorization_url_requires_client_id() {
        let client = KakaoClient::new(OAuthClientConfig::default()).unwrap();
        assert!(matches!(
            client.authorization_url(),
            Err(AuthError::Configuration(_))
        ));
    }
}
