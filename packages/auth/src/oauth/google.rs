// ABOUTME: Google OAuth 2.0 client
// ABOUTME: Builds the offline consent URL, exchanges codes, loads userinfo, and revokes grants

use async_trait::async_trait;
use laundrylens_config::OAuthClientConfig;
use laundrylens_core::SocialProvider;
use reqwest::Client;
use tracing::{debug, error, info};
use url::Url;

use crate::error::{AuthError, AuthResult};
use crate::oauth::types::{GoogleUserResponse, OAuthUser, ProviderTokenResponse};
use crate::oauth::{create_client, nickname_or, trim_base, SocialLoginClient};

pub const GOOGLE_ACCOUNTS_BASE_URL: &str = "https://accounts.google.com";
pub const GOOGLE_OAUTH2_BASE_URL: &str = "https://oauth2.googleapis.com";
pub const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com";

const GOOGLE_SCOPES: &str = "email profile";
const NICKNAME_FALLBACK: &str = "구글유저";

pub struct GoogleClient {
    client: Client,
    config: OAuthClientConfig,
    accounts_base: String,
    oauth2_base: String,
    api_base: String,
}

impl GoogleClient {
    pub fn new(config: OAuthClientConfig) -> AuthResult<Self> {
        Ok(Self {
            client: create_client()?,
            config,
            accounts_base: GOOGLE_ACCOUNTS_BASE_URL.to_string(),
            oauth2_base: GOOGLE_OAUTH2_BASE_URL.to_string(),
            api_base: GOOGLE_API_BASE_URL.to_string(),
        })
    }

    pub fn with_base_urls(
        mut self,
        accounts_base: impl Into<String>,
        oauth2_base: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        self.accounts_base = trim_base(accounts_base);
        self.oauth2_base = trim_base(oauth2_base);
        self.api_base = trim_base(api_base);
        self
    }

    pub fn authorization_url(&self) -> AuthResult<String> {
        if !self.config.is_configured() {
            return Err(AuthError::Configuration(
                "Google login is not configured".to_string(),
            ));
        }

        let mut url = Url::parse(&format!("{}/o/oauth2/v2/auth", self.accounts_base))
            .map_err(|e| AuthError::Configuration(format!("Invalid Google auth URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", GOOGLE_SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");

        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> AuthResult<ProviderTokenResponse> {
        debug!("Exchanging Google authorization code");

        let response = self
            .client
            .post(format!("{}/token", self.oauth2_base))
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
            error!("Google token exchange failed with status {}", response.status());
            return Err(AuthError::Unauthorized(
                "Failed to obtain a Google token".to_string(),
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn fetch_profile(&self, access_token: &str) -> AuthResult<GoogleUserResponse> {
        let response = self
            .client
            .get(format!("{}/oauth2/v2/userinfo", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            error!("Google userinfo request failed with status {}", response.status());
            return Err(AuthError::Unauthorized(
                "Failed to load the Google profile".to_string(),
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn revoke(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(format!(
                "{}/revoke?token={}",
                self.oauth2_base,
                urlencoding::encode(access_token)
            ))
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "Google revoke failed with status {}",
                response.status()
            )));
        }

        info!("Revoked Google grant");
        Ok(())
    }
}

#[async_trait]
impl SocialLoginClient for GoogleClient {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Google
    }

    fn authorization_url(&self) -> AuthResult<String> {
        GoogleClient::authorization_url(self)
    }

    async fn authenticate(&self, code: &str) -> AuthResult<OAuthUser> {
        let tokens = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&tokens.access_token).await?;

        Ok(OAuthUser {
            provider: SocialProvider::Google,
            nickname: nickname_or(profile.name, NICKNAME_FALLBACK, &profile.id),
            provider_id: profile.id,
            email: profile.email.filter(|e| !e.is_empty()),
            profile_image: profile.picture,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    async fn disconnect(&self, access_token: &str) -> AuthResult<()> {
        self.revoke(access_token).await
    }
}
