// ABOUTME: Analysis history storage layer using SQLite
// ABOUTME: Stores each analysis with its detected symbols as JSON

use laundrylens_core::{generate_id, UsageIdentity};
use laundrylens_storage::{now_timestamp, parse_timestamp, StorageError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use crate::analyze::types::{AnalysisRecord, DetectedSymbol};

#[derive(Clone)]
pub struct AnalysisHistoryStorage {
    pool: SqlitePool,
}

impl AnalysisHistoryStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        identity: &UsageIdentity,
        image_url: &str,
        symbols: &[DetectedSymbol],
        care_tips: Option<&str>,
    ) -> Result<AnalysisRecord, StorageError> {
        let id = generate_id();
        debug!("Saving analysis {} for {}", id, identity);

        sqlx::query(
            r#"
            INSERT INTO analysis_history (id, user_id, guest_id, image_url, result, care_tips, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(identity.user_id())
        .bind(identity.guest_id())
        .bind(image_url)
        .bind(serde_json::to_string(symbols)?)
        .bind(care_tips)
        .bind(now_timestamp())
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id).await?.ok_or(StorageError::NotFound)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<AnalysisRecord>, StorageError> {
        let row = sqlx::query("SELECT * FROM analysis_history WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    /// Newest `limit` analyses of a member
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<AnalysisRecord>, StorageError> {
        debug!("Listing analyses for user {}", user_id);

        let rows = sqlx::query(
            r#"
            SELECT * FROM analysis_history
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }
}

fn row_to_record(row: &SqliteRow) -> Result<AnalysisRecord, StorageError> {
    let result: String = row.try_get("result")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(AnalysisRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        guest_id: row.try_get("guest_id")?,
        image_url: row.try_get("image_url")?,
        result: serde_json::from_str(&result)?,
        care_tips: row.try_get("care_tips")?,
        created_at: parse_timestamp(&created_at)?,
    })
}
