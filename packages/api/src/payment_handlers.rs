// ABOUTME: HTTP request handlers for Toss checkout
// ABOUTME: Order preparation, confirmation, refunds, and payment history

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use laundrylens_billing::{
    CancelPaymentInput, ConfirmPaymentInput, CreatePaymentInput, Payment, PaymentList,
};
use tracing::info;

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::response::{with_status, ApiResponse, ApiResult};
use crate::state::AppState;

/// Create a PENDING order the client hands to the Toss widget
pub async fn prepare(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreatePaymentInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(input) = payload?;
    info!(
        user_id = %user.id,
        "Preparing {} payment of {}", input.plan_type, input.amount
    );
    let payment = state.payments.create_payment(&user.id, input).await?;
    Ok(with_status(StatusCode::CREATED, payment))
}

pub async fn confirm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ConfirmPaymentInput>, JsonRejection>,
) -> ApiResult<Payment> {
    let Json(input) = payload?;
    if input.order_id.trim().is_empty() || input.payment_key.trim().is_empty() {
        return Err(AppError::Validation(
            "orderId and paymentKey are required".to_string(),
        ));
    }

    info!(user_id = %user.id, order_id = %input.order_id, "Confirming payment");
    let payment = state.payments.confirm_payment(&user.id, input).await?;
    Ok(ApiResponse::success(payment))
}

pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<PaymentList> {
    Ok(ApiResponse::success(
        state.payments.payment_history(&user.id).await?,
    ))
}

pub async fn get_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Payment> {
    Ok(ApiResponse::success(
        state.payments.payment_by_id(&user.id, &id).await?,
    ))
}

/// Refund a completed payment. The body is optional.
pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    body: Result<Option<Json<CancelPaymentInput>>, JsonRejection>,
) -> ApiResult<Payment> {
    let input = body?.map(|Json(input)| input).unwrap_or_default();
    info!(user_id = %user.id, payment_id = %id, "Cancelling payment");

    let payment = state
        .payments
        .cancel_payment(&user.id, &id, input.cancel_reason.as_deref())
        .await?;
    Ok(ApiResponse::success(payment))
}
