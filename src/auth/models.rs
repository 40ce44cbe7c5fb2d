//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// JWT claims carried by both access and refresh tokens
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// User database model
///
/// `limit_reset_date` and `subscription_expiry` are RFC 3339 strings, matching
/// the TEXT columns SQLite stores them in.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub subscription_level: String,
    pub request_limit: i64,
    pub requests_this_month: i64,
    pub limit_reset_date: String,
    pub subscription_expiry: Option<String>,
    pub created_at: Option<String>,
}

/// Subscription tiers and the limits derived from them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionTier {
    Free,
    Paid,
}

impl SubscriptionTier {
    /// Resolve a stored subscription_level; anything unknown counts as free
    pub fn from_level(level: &str) -> Self {
        if level == "paid" {
            SubscriptionTier::Paid
        } else {
            SubscriptionTier::Free
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Paid => "paid",
        }
    }

    /// Monthly generation request quota for this tier
    pub fn request_limit(&self) -> i64 {
        match self {
            SubscriptionTier::Free => 15,
            SubscriptionTier::Paid => 60,
        }
    }

    /// How many configurations a user on this tier may keep saved
    pub fn config_limit(&self) -> i64 {
        match self {
            SubscriptionTier::Free => 5,
            SubscriptionTier::Paid => 25,
        }
    }
}

/// Login request body
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body for /auth/refresh
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
