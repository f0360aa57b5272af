// ABOUTME: User type definitions
// ABOUTME: Member profile, creation/update inputs, and provider token pairs

use chrono::{DateTime, Utc};
use laundrylens_core::SocialProvider;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub nickname: String,
    pub profile_image: Option<String>,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub email: Option<String>,
    pub nickname: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub nickname: Option<String>,
    pub profile_image: Option<String>,
}

/// Tokens issued by a social provider, stored encrypted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// A social identity attached to a member, with decrypted tokens
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedAccount {
    pub provider: SocialProvider,
    pub provider_id: String,
    pub tokens: ProviderTokens,
}
