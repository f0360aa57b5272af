// ABOUTME: Subscription records and the quota views derived from them
// ABOUTME: Serialized in camelCase for the HTTP layer

use chrono::{DateTime, Utc};
use laundrylens_core::{PlanType, SubscriptionStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan_type: PlanType,
    pub credits: i64,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionList {
    pub subscriptions: Vec<Subscription>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusView {
    pub is_premium: bool,
    pub current_subscription: Option<Subscription>,
    pub free_analysis_remaining: u32,
    pub credits_remaining: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditUsage {
    pub success: bool,
    pub remaining_credits: i64,
}

/// What an identity may still spend today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    Free { used: u32, remaining: u32 },
    Unlimited,
    Credits { remaining: i64 },
}

impl Allowance {
    pub fn permits_analysis(&self) -> bool {
        match self {
            Self::Free { remaining, .. } => *remaining > 0,
            Self::Unlimited => true,
            Self::Credits { remaining } => *remaining > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub remaining: u32,
    pub daily_limit: u32,
    pub reset_at: DateTime<Utc>,
    pub unlimited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_remaining: Option<i64>,
}
