// ABOUTME: HTTP request handlers for member subscriptions
// ABOUTME: Status, current plan, history, and cancellation

use axum::extract::State;
use laundrylens_billing::{Subscription, SubscriptionList, SubscriptionStatusView};
use tracing::info;

use crate::extractors::CurrentUser;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn get_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<SubscriptionStatusView> {
    let status = state.subscriptions.subscription_status(&user.id).await?;
    Ok(ApiResponse::success(status))
}

/// Active plan, or `null` data when the member has none
pub async fn get_current(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Option<Subscription>> {
    let current = state.subscriptions.current_subscription(&user.id).await?;
    Ok(ApiResponse::success(current))
}

pub async fn get_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<SubscriptionList> {
    let history = state.subscriptions.subscription_history(&user.id).await?;
    Ok(ApiResponse::success(history))
}

pub async fn cancel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Subscription> {
    info!(user_id = %user.id, "Cancelling subscription");
    let cancelled = state.subscriptions.cancel_subscription(&user.id).await?;
    Ok(ApiResponse::success(cancelled))
}
