// ABOUTME: Toss Payments API client
// ABOUTME: Confirms widget payments and cancels them using the merchant secret key

use std::time::Duration;

use laundrylens_config::TossConfig;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{BillingError, BillingResult};

pub const TOSS_API_URL: &str = "https://api.tosspayments.com/v1";

const GATEWAY_FALLBACK_MESSAGE: &str = "Payment processing failed";

/// Subset of the Toss payment object the service reads
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TossPayment {
    pub payment_key: String,
    pub order_id: String,
    pub status: String,
    pub total_amount: Option<i64>,
    pub method: Option<String>,
    pub approved_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TossErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest<'a> {
    payment_key: &'a str,
    order_id: &'a str,
    amount: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelRequest<'a> {
    cancel_reason: &'a str,
}

#[derive(Clone)]
pub struct TossClient {
    client: Client,
    secret_key: Option<String>,
    api_url: String,
}

impl TossClient {
    pub fn new(config: &TossConfig) -> BillingResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone().filter(|k| !k.is_empty()),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }

    pub async fn confirm(
        &self,
        payment_key: &str,
        order_id: &str,
        amount: i64,
    ) -> BillingResult<TossPayment> {
        let secret_key = self.secret_key()?;
        debug!("Confirming Toss payment for order {}", order_id);

        let response = self
            .client
            .post(format!("{}/payments/confirm", self.api_url))
            .basic_auth(secret_key, Some(""))
            .json(&ConfirmRequest {
                payment_key,
                order_id,
                amount,
            })
            .send()
            .await
            .map_err(|e| {
                error!("Toss confirm request failed: {}", e);
                BillingError::Gateway(GATEWAY_FALLBACK_MESSAGE.to_string())
            })?;

        let payment = parse_response(response, "confirm").await?;
        info!("Toss confirmed order {} ({})", payment.order_id, payment.status);
        Ok(payment)
    }

    pub async fn cancel(&self, payment_key: &str, reason: &str) -> BillingResult<TossPayment> {
        let secret_key = self.secret_key()?;
        debug!("Cancelling Toss payment");

        let response = self
            .client
            .post(format!(
                "{}/payments/{}/cancel",
                self.api_url,
                urlencoding::encode(payment_key)
            ))
            .basic_auth(secret_key, Some(""))
            .json(&CancelRequest {
                cancel_reason: reason,
            })
            .send()
            .await
            .map_err(|e| {
                error!("Toss cancel request failed: {}", e);
                BillingError::Gateway(GATEWAY_FALLBACK_MESSAGE.to_string())
            })?;

        let payment = parse_response(response, "cancel").await?;
        info!("Toss cancelled order {}", payment.order_id);
        Ok(payment)
    }

    fn secret_key(&self) -> BillingResult<&str> {
        self.secret_key
            .as_deref()
            .ok_or(BillingError::GatewayNotConfigured)
    }
}

async fn parse_response(response: Response, operation: &str) -> BillingResult<TossPayment> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(|e| {
            error!("Unreadable Toss {} response: {}", operation, e);
            BillingError::Gateway(GATEWAY_FALLBACK_MESSAGE.to_string())
        });
    }

    let body: Option<TossErrorBody> = response.json().await.ok();
    let (code, message) = body
        .map(|b| (b.code, b.message))
        .unwrap_or((None, None));

    error!(
        "Toss {} failed with status {} ({})",
        operation,
        status,
        code.as_deref().unwrap_or("no code")
    );

    Err(BillingError::Gateway(
        message.unwrap_or_else(|| GATEWAY_FALLBACK_MESSAGE.to_string()),
    ))
}
