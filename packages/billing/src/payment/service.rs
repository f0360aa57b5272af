// ABOUTME: Checkout flow: prepare an order, confirm it with Toss, and cancel it
// ABOUTME: A confirmed payment activates the plan it paid for

use chrono::TimeDelta;
use laundrylens_core::constants::MONTHLY_PLAN_DAYS;
use laundrylens_core::{generate_order_id, PaymentStatus, PlanType};
use laundrylens_storage::StorageError;
use tracing::{info, warn};

use super::storage::PaymentStorage;
use super::toss::TossClient;
use super::types::{ConfirmPaymentInput, CreatePaymentInput, Payment, PaymentList};
use crate::error::{BillingError, BillingResult};

const DEFAULT_CANCEL_REASON: &str = "Customer request";

#[derive(Clone)]
pub struct PaymentService {
    storage: PaymentStorage,
    toss: TossClient,
    credit_pack_size: i64,
}

impl PaymentService {
    pub fn new(storage: PaymentStorage, toss: TossClient, credit_pack_size: i64) -> Self {
        Self {
            storage,
            toss,
            credit_pack_size,
        }
    }

    /// Record a PENDING order for the payment widget
    pub async fn create_payment(
        &self,
        user_id: &str,
        input: CreatePaymentInput,
    ) -> BillingResult<Payment> {
        if input.amount < 1 {
            return Err(BillingError::InvalidAmount(input.amount));
        }

        let order_id = generate_order_id();
        info!(
            "Preparing {} payment {} for user {}",
            input.plan_type, order_id, user_id
        );

        Ok(self
            .storage
            .create(user_id, &order_id, input.amount, input.plan_type)
            .await?)
    }

    pub async fn confirm_payment(
        &self,
        user_id: &str,
        input: ConfirmPaymentInput,
    ) -> BillingResult<Payment> {
        let payment = self
            .storage
            .find_by_order_id(&input.order_id)
            .await?
            .filter(|p| p.user_id == user_id)
            .ok_or(BillingError::PaymentNotFound)?;

        if payment.amount != input.amount {
            warn!(
                "Amount mismatch for order {}: expected {}, got {}",
                payment.order_id, payment.amount, input.amount
            );
            return Err(BillingError::AmountMismatch);
        }

        match payment.status {
            PaymentStatus::Pending => {}
            PaymentStatus::Completed => return Err(BillingError::AlreadyCompleted),
            other => {
                return Err(BillingError::InvalidPaymentState(format!(
                    "payment is {}",
                    other
                )))
            }
        }

        self.toss
            .confirm(&input.payment_key, &payment.order_id, payment.amount)
            .await?;

        let credits = match payment.plan_type {
            PlanType::Credits => self.credit_pack_size.max(0),
            PlanType::Monthly => 0,
        };
        let subscription_id = self
            .storage
            .complete_and_activate(
                &payment,
                &input.payment_key,
                credits,
                TimeDelta::days(MONTHLY_PLAN_DAYS),
            )
            .await
            .map_err(|e| match e {
                StorageError::NotFound => BillingError::UserNotFound,
                other => other.into(),
            })?
            .ok_or(BillingError::AlreadyCompleted)?;
        info!(
            "Payment {} completed for user {}, activated subscription {}",
            payment.id, user_id, subscription_id
        );

        self.payment_by_id(user_id, &payment.id).await
    }

    /// Refund a completed payment and end the plan it bought
    pub async fn cancel_payment(
        &self,
        user_id: &str,
        payment_id: &str,
        reason: Option<&str>,
    ) -> BillingResult<Payment> {
        let payment = self.payment_by_id(user_id, payment_id).await?;

        if payment.status != PaymentStatus::Completed {
            return Err(BillingError::InvalidPaymentState(
                "only completed payments can be cancelled".to_string(),
            ));
        }
        let payment_key = payment.payment_key.as_deref().ok_or_else(|| {
            BillingError::InvalidPaymentState("payment has no gateway key".to_string())
        })?;

        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_CANCEL_REASON);
        self.toss.cancel(payment_key, reason).await?;

        let refund = self.storage.refund(&payment).await?.ok_or_else(|| {
            BillingError::InvalidPaymentState("payment changed while cancelling".to_string())
        })?;
        if let Some(subscription_id) = refund.cancelled_subscription {
            info!(
                "Cancelled subscription {} with payment {}",
                subscription_id, payment.id
            );
        }

        info!("Payment {} cancelled for user {}", payment.id, user_id);

        self.payment_by_id(user_id, &payment.id).await
    }

    pub async fn payment_history(&self, user_id: &str) -> BillingResult<PaymentList> {
        let payments = self.storage.list_for_user(user_id).await?;
        Ok(PaymentList {
            total: payments.len(),
            payments,
        })
    }

    pub async fn payment_by_id(&self, user_id: &str, payment_id: &str) -> BillingResult<Payment> {
        self.storage
            .find_for_user(user_id, payment_id)
            .await?
            .ok_or(BillingError::PaymentNotFound)
    }
}
