// ABOUTME: Payment records and request payloads for the checkout flow
// ABOUTME: Serialized in camelCase for the HTTP layer

use chrono::{DateTime, Utc};
use laundrylens_core::{PaymentStatus, PlanType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub order_id: String,
    pub payment_key: Option<String>,
    pub amount: i64,
    pub plan_type: PlanType,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentList {
    pub payments: Vec<Payment>,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentInput {
    pub amount: i64,
    pub plan_type: PlanType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentInput {
    pub order_id: String,
    pub payment_key: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelPaymentInput {
    pub cancel_reason: Option<String>,
}
