// ABOUTME: Subscription storage layer using SQLite
// ABOUTME: Keeps at most one active subscription per user and mirrors it into the premium flag

use chrono::{DateTime, TimeDelta, Utc};
use laundrylens_core::{generate_id, PlanType, SubscriptionStatus};
use laundrylens_storage::{format_timestamp, parse_timestamp, StorageError};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::types::Subscription;

const SUBSCRIPTION_COLUMNS: &str =
    "id, user_id, plan_type, credits, started_at, expires_at, status, payment_id, created_at, updated_at";

#[derive(Clone)]
pub struct SubscriptionStorage {
    pool: SqlitePool,
}

impl SubscriptionStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace the user's active subscription with a fresh one and mark them premium
    pub async fn activate(
        &self,
        user_id: &str,
        plan_type: PlanType,
        credits: i64,
        period: TimeDelta,
    ) -> Result<Subscription, StorageError> {
        let mut tx = self.pool.begin().await?;
        let id = insert_active(&mut *tx, user_id, plan_type, credits, period, None).await?;
        tx.commit().await?;

        self.find_by_id(&id).await?.ok_or(StorageError::NotFound)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Subscription>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE id = ?",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_subscription).transpose()
    }

    /// Newest active subscription that has not run out at `now`
    pub async fn current(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscription>, StorageError> {
        debug!("Fetching current subscription for user {}", user_id);

        let row = sqlx::query(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE user_id = ? AND status = 'ACTIVE' AND expires_at >= ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .bind(format_timestamp(now))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_subscription).transpose()
    }

    /// Flip active subscriptions past their end to EXPIRED.
    /// Clears the premium flag when nothing active is left.
    pub async fn expire_lapsed(&self, user_id: &str, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let stamp = format_timestamp(now);
        let mut tx = self.pool.begin().await?;

        let expired = sqlx::query(
            r#"
            UPDATE subscriptions SET status = 'EXPIRED', updated_at = ?
            WHERE user_id = ? AND status = 'ACTIVE' AND expires_at < ?
            "#,
        )
        .bind(&stamp)
        .bind(user_id)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if expired > 0 {
            debug!("Expired {} subscriptions for user {}", expired, user_id);
            sqlx::query(
                r#"
                UPDATE users SET is_premium = 0, updated_at = ?
                WHERE id = ?
                  AND NOT EXISTS (
                      SELECT 1 FROM subscriptions WHERE user_id = ? AND status = 'ACTIVE'
                  )
                "#,
            )
            .bind(&stamp)
            .bind(user_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(expired)
    }

    /// Cancel one subscription and drop the owner's premium flag
    pub async fn cancel(&self, id: &str, user_id: &str) -> Result<Subscription, StorageError> {
        debug!("Cancelling subscription {} for user {}", id, user_id);

        let stamp = format_timestamp(Utc::now());
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET status = 'CANCELLED', updated_at = ?
            WHERE id = ? AND user_id = ? AND status = 'ACTIVE'
            "#,
        )
        .bind(&stamp)
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        sqlx::query("UPDATE users SET is_premium = 0, updated_at = ? WHERE id = ?")
            .bind(&stamp)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or(StorageError::NotFound)
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<Subscription>, StorageError> {
        debug!("Listing subscriptions for user {}", user_id);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_subscription).collect()
    }

    /// Take `amount` credits from an active subscription.
    /// Returns the new balance, or `None` when the balance would go negative.
    pub async fn deduct_credits(&self, id: &str, amount: i64) -> Result<Option<i64>, StorageError> {
        debug!("Deducting {} credits from subscription {}", amount, id);

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE subscriptions SET credits = credits - ?, updated_at = ?
            WHERE id = ? AND status = 'ACTIVE' AND credits >= ?
            RETURNING credits
            "#,
        )
        .bind(amount)
        .bind(format_timestamp(Utc::now()))
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        Ok(remaining)
    }
}

/// Cancel the user's active plans, insert a new ACTIVE one and set the premium flag.
/// Runs on the caller's connection so it can share a transaction with payment updates.
pub(crate) async fn insert_active(
    conn: &mut SqliteConnection,
    user_id: &str,
    plan_type: PlanType,
    credits: i64,
    period: TimeDelta,
    payment_id: Option<&str>,
) -> Result<String, StorageError> {
    let id = generate_id();
    let now = Utc::now();
    let stamp = format_timestamp(now);
    debug!("Activating {} subscription {} for user {}", plan_type, id, user_id);

    let premium = sqlx::query(
        "UPDATE users SET is_premium = 1, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&stamp)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    if premium.rows_affected() == 0 {
        return Err(StorageError::NotFound);
    }

    let replaced = sqlx::query(
        r#"
        UPDATE subscriptions SET status = 'CANCELLED', updated_at = ?
        WHERE user_id = ? AND status = 'ACTIVE'
        "#,
    )
    .bind(&stamp)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    if replaced.rows_affected() > 0 {
        debug!(
            "Cancelled {} previous subscriptions for user {}",
            replaced.rows_affected(),
            user_id
        );
    }

    sqlx::query(
        r#"
        INSERT INTO subscriptions (id, user_id, plan_type, credits, started_at, expires_at, status, payment_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, 'ACTIVE', ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(plan_type.as_str())
    .bind(credits)
    .bind(&stamp)
    .bind(format_timestamp(now + period))
    .bind(payment_id)
    .bind(&stamp)
    .bind(&stamp)
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

/// Cancel the active plan bought by `payment_id`, if it is still running.
/// The premium flag is cleared only when the user has no other active plan.
pub(crate) async fn cancel_bought_by(
    conn: &mut SqliteConnection,
    payment_id: &str,
    user_id: &str,
) -> Result<Option<String>, StorageError> {
    let stamp = format_timestamp(Utc::now());

    let cancelled: Option<String> = sqlx::query_scalar(
        r#"
        UPDATE subscriptions SET status = 'CANCELLED', updated_at = ?
        WHERE payment_id = ? AND user_id = ? AND status = 'ACTIVE'
        RETURNING id
        "#,
    )
    .bind(&stamp)
    .bind(payment_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    if cancelled.is_some() {
        sqlx::query(
            r#"
            UPDATE users SET is_premium = 0, updated_at = ?
            WHERE id = ?
              AND NOT EXISTS (
                  SELECT 1 FROM subscriptions WHERE user_id = ? AND status = 'ACTIVE'
              )
            "#,
        )
        .bind(&stamp)
        .bind(user_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(cancelled)
}

fn row_to_subscription(row: &SqliteRow) -> Result<Subscription, StorageError> {
    let plan_type: String = row.try_get("plan_type")?;
    let status: String = row.try_get("status")?;
    let started_at: String = row.try_get("started_at")?;
    let expires_at: String = row.try_get("expires_at")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Subscription {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        plan_type: plan_type
            .parse::<PlanType>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?,
        credits: row.try_get("credits")?,
        started_at: parse_timestamp(&started_at)?,
        expires_at: parse_timestamp(&expires_at)?,
        status: status
            .parse::<SubscriptionStatus>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?,
        payment_id: row.try_get("payment_id")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
