//! # Account Module
//!
//! Email-based account lifecycle:
//! - Registration with a mailed 6-digit verification code
//! - Password reset through the same code mechanism
//! - Account info for the profile page

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::account_routes;
