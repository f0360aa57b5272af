// ABOUTME: Subscription lifecycle and daily quota decisions
// ABOUTME: Combines usage logs, the premium flag, and the active plan into an allowance

use chrono::{DateTime, TimeDelta, Utc};
use laundrylens_core::constants::{FREE_ANALYSIS_LIMIT, MONTHLY_PLAN_DAYS};
use laundrylens_core::{PlanType, QuotaClock, UsageAction, UsageIdentity};
use laundrylens_storage::StorageError;
use laundrylens_users::UserStorage;
use tracing::{debug, info, warn};

use super::storage::SubscriptionStorage;
use super::types::{
    Allowance, CreditUsage, Subscription, SubscriptionList, SubscriptionStatusView, UsageSummary,
};
use crate::error::{BillingError, BillingResult};
use crate::usage::UsageLogStorage;

#[derive(Clone)]
pub struct SubscriptionService {
    storage: SubscriptionStorage,
    usage: UsageLogStorage,
    users: UserStorage,
    clock: QuotaClock,
    daily_limit: u32,
}

impl SubscriptionService {
    pub fn new(
        storage: SubscriptionStorage,
        usage: UsageLogStorage,
        users: UserStorage,
        clock: QuotaClock,
    ) -> Self {
        Self {
            storage,
            usage,
            users,
            clock,
            daily_limit: FREE_ANALYSIS_LIMIT,
        }
    }

    pub fn clock(&self) -> QuotaClock {
        self.clock
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Start a new plan for `user_id`, replacing whatever was active
    pub async fn create_subscription(
        &self,
        user_id: &str,
        plan_type: PlanType,
        credits: i64,
    ) -> BillingResult<Subscription> {
        info!("Creating {} subscription for user {}", plan_type, user_id);

        let credits = match plan_type {
            PlanType::Credits => credits.max(0),
            PlanType::Monthly => 0,
        };

        self.storage
            .activate(
                user_id,
                plan_type,
                credits,
                TimeDelta::days(MONTHLY_PLAN_DAYS),
            )
            .await
            .map_err(|e| match e {
                StorageError::NotFound => BillingError::UserNotFound,
                other => other.into(),
            })
    }

    pub async fn current_subscription(&self, user_id: &str) -> BillingResult<Option<Subscription>> {
        let now = Utc::now();
        self.storage.expire_lapsed(user_id, now).await?;
        Ok(self.storage.current(user_id, now).await?)
    }

    pub async fn subscription_status(&self, user_id: &str) -> BillingResult<SubscriptionStatusView> {
        let current = self.current_subscription(user_id).await?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(BillingError::UserNotFound)?;

        let identity = UsageIdentity::Member(user.id.clone());
        let used = self.used_today(&identity, Utc::now()).await?;

        // Monthly plans carry a zero balance
        let credits_remaining = current.as_ref().map(|s| s.credits);

        Ok(SubscriptionStatusView {
            is_premium: user.is_premium,
            current_subscription: current,
            free_analysis_remaining: self.daily_limit.saturating_sub(used),
            credits_remaining,
        })
    }

    /// Spend credits on the active plan. Monthly plans never consume credits.
    pub async fn use_credits(&self, user_id: &str, amount: i64) -> BillingResult<CreditUsage> {
        if amount < 1 {
            return Err(BillingError::InvalidAmount(amount));
        }

        let subscription = self
            .current_subscription(user_id)
            .await?
            .ok_or(BillingError::NoActiveSubscription)?;

        if subscription.plan_type == PlanType::Monthly {
            return Ok(CreditUsage {
                success: true,
                remaining_credits: 0,
            });
        }

        if subscription.credits < amount {
            return Err(BillingError::InsufficientCredits);
        }

        let remaining = self
            .storage
            .deduct_credits(&subscription.id, amount)
            .await?
            .ok_or(BillingError::InsufficientCredits)?;

        debug!(
            "User {} spent {} credits, {} left",
            user_id, amount, remaining
        );

        Ok(CreditUsage {
            success: true,
            remaining_credits: remaining,
        })
    }

    pub async fn cancel_subscription(&self, user_id: &str) -> BillingResult<Subscription> {
        let current = self
            .current_subscription(user_id)
            .await?
            .ok_or(BillingError::SubscriptionNotFound)?;

        info!("Cancelling subscription {} for user {}", current.id, user_id);

        self.storage
            .cancel(&current.id, user_id)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => BillingError::SubscriptionNotFound,
                other => other.into(),
            })
    }

    pub async fn subscription_history(&self, user_id: &str) -> BillingResult<SubscriptionList> {
        let subscriptions = self.storage.history(user_id).await?;
        Ok(SubscriptionList {
            total: subscriptions.len(),
            subscriptions,
        })
    }

    /// What `identity` may still spend today
    pub async fn allowance(&self, identity: &UsageIdentity) -> BillingResult<Allowance> {
        self.allowance_at(identity, Utc::now()).await
    }

    async fn allowance_at(
        &self,
        identity: &UsageIdentity,
        now: DateTime<Utc>,
    ) -> BillingResult<Allowance> {
        if let UsageIdentity::Member(user_id) = identity {
            let user = self
                .users
                .find_by_id(user_id)
                .await?
                .ok_or(BillingError::UserNotFound)?;

            if user.is_premium {
                match self.current_subscription(user_id).await? {
                    Some(sub) if sub.plan_type == PlanType::Monthly => {
                        return Ok(Allowance::Unlimited)
                    }
                    Some(sub) => {
                        return Ok(Allowance::Credits {
                            remaining: sub.credits,
                        })
                    }
                    None => {
                        warn!("User {} is premium without an active subscription", user_id);
                    }
                }
            }
        }

        let used = self.used_today(identity, now).await?;
        Ok(Allowance::Free {
            used,
            remaining: self.daily_limit.saturating_sub(used),
        })
    }

    /// Whether another analysis is allowed. Callers without any identity never are.
    pub async fn can_analyze(&self, identity: Option<&UsageIdentity>) -> BillingResult<bool> {
        match identity {
            Some(identity) => Ok(self.allowance(identity).await?.permits_analysis()),
            None => Ok(false),
        }
    }

    pub async fn usage_summary(&self, identity: &UsageIdentity) -> BillingResult<UsageSummary> {
        let now = Utc::now();
        let reset_at = self.clock.reset_at(now);

        let summary = match self.allowance_at(identity, now).await? {
            Allowance::Free { remaining, .. } => UsageSummary {
                remaining,
                daily_limit: self.daily_limit,
                reset_at,
                unlimited: false,
                credits_remaining: None,
            },
            Allowance::Unlimited => UsageSummary {
                remaining: self.daily_limit,
                daily_limit: self.daily_limit,
                reset_at,
                unlimited: true,
                credits_remaining: None,
            },
            Allowance::Credits { remaining } => UsageSummary {
                remaining: u32::try_from(remaining.max(0)).unwrap_or(u32::MAX),
                daily_limit: self.daily_limit,
                reset_at,
                unlimited: false,
                credits_remaining: Some(remaining),
            },
        };

        Ok(summary)
    }

    async fn used_today(&self, identity: &UsageIdentity, now: DateTime<Utc>) -> BillingResult<u32> {
        let since = self.clock.start_of_day(now);
        Ok(self
            .usage
            .count_since(identity, UsageAction::Analyze, since)
            .await?)
    }
}
