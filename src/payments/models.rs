//! Payment order data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Payment order database model
///
/// `order_id` is ours, generated when the payment is created; `payment_id`
/// is the gateway's identifier and never leaves the backend.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct PaymentOrder {
    pub order_id: String,
    pub user_id: String,
    pub plan: String,
    pub amount: String,
    pub status: String,
    #[serde(skip_serializing)]
    pub payment_id: String,
    pub created_at: String,
}

/// Payment creation request body
#[derive(Deserialize)]
pub struct PayRequest {
    pub amount: String,
    pub plan: String,
}

/// Response body for POST /payments/create
#[derive(Serialize)]
pub struct PaymentUrlResponse {
    pub payment_url: String,
}

/// Response body for GET /payments/:order_id/status
#[derive(Serialize)]
pub struct PaymentStatusResponse {
    pub payment_status: String,
}
