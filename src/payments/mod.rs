//! # Payments Module
//!
//! Subscription upgrades through the payment gateway:
//! - Create a payment and hand the user the gateway redirect URL
//! - Poll order status, owner-scoped
//! - Webhook that activates the paid tier once a payment succeeds

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::payments_routes;
