//! JWT issuance and validation
//!
//! Token validity is purely a function of signature and expiry. There is no
//! server-side revocation: logout only clears cookies, and a leaked token
//! stays valid until its natural expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::warn;

use super::models::Claims;
use crate::common::AppConfig;

/// Issues and validates the signed access/refresh token pair
pub struct TokenService {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            access_ttl: config.access_token_expire(),
            refresh_ttl: config.refresh_token_expire(),
        }
    }

    /// Short-lived token authorizing API calls
    pub fn issue_access(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(subject, self.access_ttl)
    }

    /// Long-lived token used solely to mint a new access/refresh pair
    pub fn issue_refresh(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(subject, self.refresh_ttl)
    }

    fn issue(&self, subject: &str, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = (Utc::now() + ttl).timestamp() as usize;
        let claims = Claims {
            sub: subject.to_string(),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verifies signature and expiry; returns None on any failure
    /// (malformed token, bad signature, expired claims)
    pub fn decode(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                warn!(error = %e, "JWT token validation failed");
                None
            }
        }
    }

    /// Cookie Max-Age for the access token, in seconds
    pub fn access_max_age(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Cookie Max-Age for the refresh token, in seconds
    pub fn refresh_max_age(&self) -> i64 {
        self.refresh_ttl.num_seconds()
    }
}
