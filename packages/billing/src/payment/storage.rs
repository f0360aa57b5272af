// ABOUTME: Payment storage layer using SQLite
// ABOUTME: Orders are created PENDING and move to a final state through guarded updates

use chrono::TimeDelta;
use laundrylens_core::{generate_id, PaymentStatus, PlanType};
use laundrylens_storage::{now_timestamp, parse_timestamp, StorageError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use super::types::Payment;
use crate::subscription::storage::{cancel_bought_by, insert_active};

const PAYMENT_COLUMNS: &str =
    "id, user_id, order_id, payment_key, amount, plan_type, status, created_at, updated_at";

#[derive(Clone)]
pub struct PaymentStorage {
    pool: SqlitePool,
}

impl PaymentStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        order_id: &str,
        amount: i64,
        plan_type: PlanType,
    ) -> Result<Payment, StorageError> {
        let id = generate_id();
        let now = now_timestamp();
        debug!("Creating payment {} ({}) for user {}", id, order_id, user_id);

        sqlx::query(
            r#"
            INSERT INTO payments (id, user_id, order_id, payment_key, amount, plan_type, status, created_at, updated_at)
            VALUES (?, ?, ?, NULL, ?, ?, 'PENDING', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(order_id)
        .bind(amount)
        .bind(plan_type.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id).await?.ok_or(StorageError::NotFound)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_payment).transpose()
    }

    pub async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>, StorageError> {
        debug!("Fetching payment by order {}", order_id);

        let row = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE order_id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_payment).transpose()
    }

    /// Payment `id` if it belongs to `user_id`
    pub async fn find_for_user(&self, user_id: &str, id: &str) -> Result<Option<Payment>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE id = ? AND user_id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_payment).transpose()
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Payment>, StorageError> {
        debug!("Listing payments for user {}", user_id);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            PAYMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_payment).collect()
    }

    /// PENDING -> COMPLETED with the gateway's payment key, activating the plan it paid for
    /// in the same transaction. `None` when the order already moved on.
    pub async fn complete_and_activate(
        &self,
        payment: &Payment,
        payment_key: &str,
        credits: i64,
        period: TimeDelta,
    ) -> Result<Option<String>, StorageError> {
        debug!("Completing payment {}", payment.id);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE payments SET status = 'COMPLETED', payment_key = ?, updated_at = ?
            WHERE id = ? AND status = 'PENDING'
            "#,
        )
        .bind(payment_key)
        .bind(now_timestamp())
        .bind(&payment.id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let subscription_id = insert_active(
            &mut *tx,
            &payment.user_id,
            payment.plan_type,
            credits,
            period,
            Some(&payment.id),
        )
        .await?;

        tx.commit().await?;
        Ok(Some(subscription_id))
    }

    /// COMPLETED -> CANCELLED, ending the plan this payment bought if it is still active.
    /// `None` when the payment was not COMPLETED.
    pub async fn refund(&self, payment: &Payment) -> Result<Option<Refund>, StorageError> {
        debug!("Refunding payment {}", payment.id);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE payments SET status = 'CANCELLED', updated_at = ?
            WHERE id = ? AND status = 'COMPLETED'
            "#,
        )
        .bind(now_timestamp())
        .bind(&payment.id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let cancelled_subscription =
            cancel_bought_by(&mut *tx, &payment.id, &payment.user_id).await?;

        tx.commit().await?;
        Ok(Some(Refund {
            cancelled_subscription,
        }))
    }
}

/// Outcome of a refunded payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refund {
    /// Plan bought by the payment that was still active and has been cancelled
    pub cancelled_subscription: Option<String>,
}

fn row_to_payment(row: &SqliteRow) -> Result<Payment, StorageError> {
    let plan_type: String = row.try_get("plan_type")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Payment {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        order_id: row.try_get("order_id")?,
        payment_key: row.try_get("payment_key")?,
        amount: row.try_get("amount")?,
        plan_type: plan_type
            .parse::<PlanType>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?,
        status: status
            .parse::<PaymentStatus>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
