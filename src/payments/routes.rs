//! Payment routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the payments router
///
/// # Routes
/// - `POST /payments/create` - Create a payment, return the redirect URL
/// - `GET /payments/:order_id/status` - Gateway-side status of own order
/// - `POST /payments/webhook` - Inbound gateway notifications
/// - `GET /payments` - The caller's orders
pub fn payments_routes() -> Router {
    Router::new()
        .route("/payments/create", post(handlers::create_payment_handler))
        .route(
            "/payments/:order_id/status",
            get(handlers::payment_status_handler),
        )
        .route("/payments/webhook", post(handlers::webhook_handler))
        .route("/payments", get(handlers::list_payments_handler))
}
