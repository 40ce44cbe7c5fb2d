//! Saved configuration routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the configurations router
///
/// # Routes
/// - `POST /configurations` - Save a configuration (tier-capped)
/// - `GET /configurations` - List the caller's configurations
/// - `GET /configurations/:id` - Fetch one configuration
/// - `PUT /configurations/:id` - Rename or replace stored data
/// - `DELETE /configurations/:id` - Delete a configuration
pub fn configurations_routes() -> Router {
    Router::new()
        .route(
            "/configurations",
            get(handlers::list_configurations).post(handlers::create_configuration),
        )
        .route(
            "/configurations/:id",
            get(handlers::get_configuration)
                .put(handlers::update_configuration)
                .delete(handlers::delete_configuration),
        )
}
