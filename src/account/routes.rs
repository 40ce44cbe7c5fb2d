//! Account lifecycle routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the account router
///
/// # Routes
/// - `POST /register/request-code` - Start registration, mail a code
/// - `POST /register/verify` - Confirm the code, create the account
/// - `POST /password/reset/request` - Mail a password reset code
/// - `POST /password/reset/confirm` - Set the new password
/// - `GET /account/info` - Identity, subscription and quota counters
pub fn account_routes() -> Router {
    Router::new()
        .route(
            "/register/request-code",
            post(handlers::request_code_handler),
        )
        .route("/register/verify", post(handlers::verify_code_handler))
        .route(
            "/password/reset/request",
            post(handlers::reset_request_handler),
        )
        .route(
            "/password/reset/confirm",
            post(handlers::reset_confirm_handler),
        )
        .route("/account/info", get(handlers::account_info_handler))
}
