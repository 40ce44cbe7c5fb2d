//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Email/password login with access + refresh token cookies
//! - JWT token issuance, rotation and validation
//! - Argon2 password hashing
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod passwords;
pub mod routes;
pub mod tokens;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::{SubscriptionTier, User};
pub use routes::auth_routes;
pub use tokens::TokenService;
