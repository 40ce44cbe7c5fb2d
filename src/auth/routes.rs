//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/login` - Email/password login, sets token cookies
/// - `POST /auth/refresh` - Rotate the access/refresh token pair
/// - `POST /auth/logout` - Clear token cookies
/// - `GET /auth/verify` - Check the current session
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/login", post(handlers::login_handler))
        .route("/auth/refresh", post(handlers::refresh_handler))
        .route("/auth/logout", post(handlers::logout_handler))
        .route("/auth/verify", get(handlers::verify_handler))
}
