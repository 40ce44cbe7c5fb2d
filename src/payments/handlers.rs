//! Payment handlers
//!
//! The gateway is the source of truth for payment state; the local order row
//! ties a gateway payment to a user and a plan. Activation happens only on
//! the webhook, never on the client's return redirect.

use axum::extract::{Extension, Json, Path};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{PayRequest, PaymentOrder, PaymentStatusResponse, PaymentUrlResponse};
use crate::auth::models::SubscriptionTier;
use crate::auth::AuthedUser;
use crate::common::{now_rfc3339, safe_email_log, ApiError, AppState};

/// Days of paid service granted per successful payment
const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// POST /payments/create
/// Creates a payment at the gateway, stores the order row and returns the
/// redirect URL the user completes the payment at.
pub async fn create_payment_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<PayRequest>,
) -> Result<Json<PaymentUrlResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if SubscriptionTier::from_level(&payload.plan) != SubscriptionTier::Paid {
        return Err(ApiError::BadRequest(format!(
            "Unknown plan: {}",
            payload.plan
        )));
    }

    let valid_amount = payload
        .amount
        .parse::<f64>()
        .map(|v| v.is_finite() && v > 0.0)
        .unwrap_or(false);
    if !valid_amount {
        return Err(ApiError::BadRequest("Invalid amount".to_string()));
    }

    let description = format!("{} for {}", payload.plan, authed.email);
    let created = state
        .payment_service
        .create_payment(&payload.amount, &description)
        .await
        .map_err(|e| ApiError::PaymentError(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO payment_orders (order_id, user_id, plan, amount, status, payment_id, created_at)
        VALUES (?, ?, ?, ?, 'created', ?, ?)
        "#,
    )
    .bind(&created.order_id)
    .bind(&authed.id)
    .bind(&payload.plan)
    .bind(&payload.amount)
    .bind(&created.payment_id)
    .bind(now_rfc3339())
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            order_id = %created.order_id,
            "Database error storing payment order"
        );
        ApiError::DatabaseError(e)
    })?;

    info!(
        user_id = %authed.id,
        order_id = %created.order_id,
        plan = %payload.plan,
        amount = %payload.amount,
        "Payment order created"
    );

    Ok(Json(PaymentUrlResponse {
        payment_url: created.payment_url,
    }))
}

/// GET /payments/:order_id/status
/// Proxies the gateway-side status of the caller's own order
pub async fn payment_status_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(order_id): Path<String>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let order = sqlx::query_as::<_, PaymentOrder>(
        "SELECT * FROM payment_orders WHERE order_id = ? AND user_id = ?",
    )
    .bind(&order_id)
    .bind(&authed.id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?
    .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    let payment_status = state
        .payment_service
        .check_status(&order.payment_id)
        .await
        .map_err(|e| ApiError::PaymentError(e.to_string()))?;

    Ok(Json(PaymentStatusResponse { payment_status }))
}

/// POST /payments/webhook
/// Inbound gateway notification. On `succeeded` the user's subscription is
/// upgraded and extended. Unknown orders are acknowledged with an error body
/// rather than a failure status, per the gateway's delivery contract.
pub async fn webhook_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let object = payload.get("object").cloned().unwrap_or(Value::Null);
    let status = object
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let Some(order) = find_order(&state, &object).await? else {
        warn!("Payment webhook for unknown order");
        return Ok(Json(serde_json::json!({ "error": "Unknown order" })));
    };

    match status.as_str() {
        "succeeded" => {
            let limit = SubscriptionTier::from_level(&order.plan).request_limit();
            let expiry = (Utc::now() + Duration::days(SUBSCRIPTION_PERIOD_DAYS)).to_rfc3339();

            sqlx::query(
                "UPDATE users SET subscription_level = ?, request_limit = ?, subscription_expiry = ? \
                 WHERE id = ?",
            )
            .bind(&order.plan)
            .bind(limit)
            .bind(&expiry)
            .bind(&order.user_id)
            .execute(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

            sqlx::query("UPDATE payment_orders SET status = 'succeeded' WHERE order_id = ?")
                .bind(&order.order_id)
                .execute(&state.db)
                .await
                .map_err(ApiError::DatabaseError)?;

            info!(
                order_id = %order.order_id,
                user_id = %order.user_id,
                plan = %order.plan,
                "Subscription activated via payment webhook"
            );
        }
        "canceled" => {
            sqlx::query("UPDATE payment_orders SET status = 'canceled' WHERE order_id = ?")
                .bind(&order.order_id)
                .execute(&state.db)
                .await
                .map_err(ApiError::DatabaseError)?;

            info!(order_id = %order.order_id, "Payment canceled via webhook");
        }
        other => {
            // Intermediate statuses (pending, waiting_for_capture) are not
            // tracked locally
            info!(
                order_id = %order.order_id,
                status = %other,
                "Ignoring payment webhook status"
            );
        }
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// GET /payments
/// All of the caller's orders, newest first
pub async fn list_payments_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<PaymentOrder>>, ApiError> {
    let state = state_lock.read().await.clone();

    let orders = sqlx::query_as::<_, PaymentOrder>(
        "SELECT * FROM payment_orders WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            email = %safe_email_log(&authed.email),
            "Database error listing payment orders"
        );
        ApiError::DatabaseError(e)
    })?;

    Ok(Json(orders))
}

// ---- Helper Functions ----

/// Resolve the order a webhook notification refers to: by the order id we
/// planted in the payment metadata, falling back to the gateway payment id
async fn find_order(state: &AppState, object: &Value) -> Result<Option<PaymentOrder>, ApiError> {
    if let Some(order_id) = object
        .get("metadata")
        .and_then(|m| m.get("order_id"))
        .and_then(Value::as_str)
    {
        let order =
            sqlx::query_as::<_, PaymentOrder>("SELECT * FROM payment_orders WHERE order_id = ?")
                .bind(order_id)
                .fetch_optional(&state.db)
                .await
                .map_err(ApiError::DatabaseError)?;
        if order.is_some() {
            return Ok(order);
        }
    }

    if let Some(payment_id) = object.get("id").and_then(Value::as_str) {
        return sqlx::query_as::<_, PaymentOrder>(
            "SELECT * FROM payment_orders WHERE payment_id = ?",
        )
        .bind(payment_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError);
    }

    Ok(None)
}
