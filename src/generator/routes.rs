//! Generation pipeline routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the generator router
///
/// # Routes
/// - `GET /services` - Supported services summary
/// - `GET /form-metadata/:service` - Form descriptor for a service schema
/// - `POST /generate/:service` - Generate a configuration file
pub fn generator_routes() -> Router {
    Router::new()
        .route("/services", get(handlers::list_services_handler))
        .route(
            "/form-metadata/:service",
            get(handlers::form_metadata_handler),
        )
        .route("/generate/:service", post(handlers::generate_handler))
}
