// ABOUTME: Append-only usage log for metered actions
// ABOUTME: Counts an identity's actions inside a quota day

use chrono::{DateTime, Utc};
use laundrylens_core::{generate_id, UsageAction, UsageIdentity};
use laundrylens_storage::{format_timestamp, now_timestamp, StorageError};
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Clone)]
pub struct UsageLogStorage {
    pool: SqlitePool,
}

impl UsageLogStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        identity: &UsageIdentity,
        action: UsageAction,
    ) -> Result<(), StorageError> {
        debug!("Recording {} for {}", action, identity);

        sqlx::query(
            r#"
            INSERT INTO usage_logs (id, user_id, guest_id, action, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(generate_id())
        .bind(identity.user_id())
        .bind(identity.guest_id())
        .bind(action.as_str())
        .bind(now_timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of `action` entries for `identity` at or after `since`
    pub async fn count_since(
        &self,
        identity: &UsageIdentity,
        action: UsageAction,
        since: DateTime<Utc>,
    ) -> Result<u32, StorageError> {
        let (column, key) = match identity {
            UsageIdentity::Member(id) => ("user_id", id.as_str()),
            UsageIdentity::Guest(id) => ("guest_id", id.as_str()),
        };

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM usage_logs WHERE {} = ? AND action = ? AND created_at >= ?",
            column
        ))
        .bind(key)
        .bind(action.as_str())
        .bind(format_timestamp(since))
        .fetch_one(&self.pool)
        .await?;

        debug!("{} has {} {} entries since {}", identity, count, action, since);
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
