// ABOUTME: Member authentication orchestration
// ABOUTME: Reconciles OAuth identities with members, issues sessions, and handles withdrawal

use std::sync::Arc;

use laundrylens_core::SocialProvider;
use laundrylens_storage::StorageError;
use laundrylens_users::{CreateUserInput, ProviderTokens, User, UserStorage};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AuthError, AuthResult};
use crate::jwt::{Claims, JwtService, TokenType};
use crate::oauth::{OAuthUser, SocialLoginClient};

/// Member fields returned alongside a fresh session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: Option<String>,
    pub nickname: String,
    pub profile_image: Option<String>,
    pub is_premium: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            nickname: user.nickname.clone(),
            profile_image: user.profile_image.clone(),
            is_premium: user.is_premium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserStorage,
    jwt: JwtService,
    kakao: Arc<dyn SocialLoginClient>,
    google: Arc<dyn SocialLoginClient>,
}

impl AuthService {
    pub fn new(
        users: UserStorage,
        jwt: JwtService,
        kakao: Arc<dyn SocialLoginClient>,
        google: Arc<dyn SocialLoginClient>,
    ) -> Self {
        Self {
            users,
            jwt,
            kakao,
            google,
        }
    }

    pub fn client(&self, provider: SocialProvider) -> &dyn SocialLoginClient {
        match provider {
            SocialProvider::Kakao => self.kakao.as_ref(),
            SocialProvider::Google => self.google.as_ref(),
        }
    }

    pub fn authorization_url(&self, provider: SocialProvider) -> AuthResult<String> {
        self.client(provider).authorization_url()
    }

    /// Exchange a provider code and return a session for the matching member
    pub async fn login(&self, provider: SocialProvider, code: &str) -> AuthResult<TokenResponse> {
        info!("Social login via {}", provider);

        let oauth_user = self.client(provider).authenticate(code).await?;
        let user = self.validate_oauth_user(oauth_user).await?;
        self.create_token_response(&user)
    }

    /// Find or create the member for an OAuth identity.
    ///
    /// 1. Known provider identity: refresh its stored tokens.
    /// 2. Unknown identity whose email belongs to a live member: link it to that member.
    /// 3. Otherwise: create a member with this identity.
    pub async fn validate_oauth_user(&self, oauth_user: OAuthUser) -> AuthResult<User> {
        let tokens = ProviderTokens {
            access_token: Some(oauth_user.access_token.clone()),
            refresh_token: oauth_user.refresh_token.clone(),
        };

        if let Some(user) = self
            .users
            .find_by_social_account(oauth_user.provider, &oauth_user.provider_id)
            .await?
        {
            self.users
                .update_social_account_tokens(
                    oauth_user.provider,
                    &oauth_user.provider_id,
                    &tokens,
                )
                .await?;
            return Ok(user);
        }

        if let Some(email) = oauth_user.email.as_deref() {
            if let Some(user) = self.users.find_by_email(email).await? {
                info!(
                    user_id = %user.id,
                    "Linking {} account to existing member", oauth_user.provider
                );
                self.users
                    .link_social_account(
                        &user.id,
                        oauth_user.provider,
                        &oauth_user.provider_id,
                        &tokens,
                    )
                    .await?;
                return Ok(user);
            }
        }

        let user = self
            .users
            .create_with_social_account(
                CreateUserInput {
                    email: oauth_user.email,
                    nickname: oauth_user.nickname,
                    profile_image: oauth_user.profile_image,
                },
                oauth_user.provider,
                &oauth_user.provider_id,
                &tokens,
            )
            .await?;

        info!(user_id = %user.id, "Created member via {}", oauth_user.provider);
        Ok(user)
    }

    pub fn create_token_response(&self, user: &User) -> AuthResult<TokenResponse> {
        let pair = self.jwt.generate_tokens(&user.id, user.email.as_deref())?;
        Ok(TokenResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: UserSummary::from(user),
        })
    }

    pub fn validate_token(&self, token: &str, expected: TokenType) -> AuthResult<Claims> {
        self.jwt.verify(token, expected)
    }

    pub async fn refresh_tokens(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        let claims = self
            .jwt
            .verify(refresh_token, TokenType::Refresh)
            .map_err(|_| AuthError::Unauthorized("Invalid refresh token".to_string()))?;

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("User no longer exists".to_string()))?;

        self.create_token_response(&user)
    }

    /// Live member behind an access token
    pub async fn user_from_token(&self, access_token: &str) -> AuthResult<User> {
        let claims = self
            .jwt
            .verify(access_token, TokenType::Access)
            .map_err(|_| AuthError::Unauthorized("Invalid or expired token".to_string()))?;

        self.users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("User no longer exists".to_string()))
    }

    /// Disconnect the app at every linked provider, then withdraw the member.
    /// Provider failures are logged and do not block withdrawal.
    pub async fn delete_account(&self, user_id: &str) -> AuthResult<()> {
        info!(user_id = %user_id, "Deleting account");

        let accounts = self.users.list_social_accounts(user_id).await?;
        for account in accounts {
            let Some(access_token) = account.tokens.access_token.as_deref() else {
                warn!(
                    user_id = %user_id,
                    "No stored {} token, skipping provider disconnect", account.provider
                );
                continue;
            };

            if let Err(e) = self.client(account.provider).disconnect(access_token).await {
                warn!(
                    user_id = %user_id,
                    "Failed to disconnect {} account: {}", account.provider, e
                );
            }
        }

        self.users.withdraw(user_id).await.map_err(|e| match e {
            StorageError::NotFound => AuthError::UserNotFound,
            other => AuthError::Storage(other),
        })?;

        info!(user_id = %user_id, "Account deleted");
        Ok(())
    }
}
