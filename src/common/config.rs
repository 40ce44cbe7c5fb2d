// src/common/config.rs
//! Process configuration, loaded once at startup and injected through
//! `AppState`. Components never read environment variables themselves.

use chrono::Duration;
use std::env;

/// Application configuration assembled from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub ses_from_email: Option<String>,
    pub ses_region: String,
    pub payment_account_id: Option<String>,
    pub payment_secret_key: Option<String>,
    pub payment_api_url: String,
    pub payment_return_url: String,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://configen.db".to_string(),
            jwt_secret: "replace_with_strong_secret".to_string(),
            access_token_expire_minutes: 60,
            refresh_token_expire_days: 30,
            ses_from_email: None,
            ses_region: "us-east-1".to_string(),
            payment_account_id: None,
            payment_secret_key: None,
            payment_api_url: "https://api.yookassa.ru/v3".to_string(),
            payment_return_url: "http://localhost:3000/payment-return".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(secret) = env::var("JWT_SECRET") {
            config.jwt_secret = secret;
        }

        if let Ok(minutes) = env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            if let Ok(val) = minutes.parse::<i64>() {
                config.access_token_expire_minutes = val;
            }
        }

        if let Ok(days) = env::var("REFRESH_TOKEN_EXPIRE_DAYS") {
            if let Ok(val) = days.parse::<i64>() {
                config.refresh_token_expire_days = val;
            }
        }

        config.ses_from_email = env::var("SES_FROM_EMAIL").ok().filter(|v| !v.is_empty());
        if let Ok(region) = env::var("SES_REGION") {
            config.ses_region = region;
        }

        config.payment_account_id = env::var("PAYMENT_ACCOUNT_ID").ok().filter(|v| !v.is_empty());
        config.payment_secret_key = env::var("PAYMENT_SECRET_KEY").ok().filter(|v| !v.is_empty());
        if let Ok(url) = env::var("PAYMENT_API_URL") {
            config.payment_api_url = url;
        }
        if let Ok(url) = env::var("PAYMENT_RETURN_URL") {
            config.payment_return_url = url;
        }

        if let Ok(origins) = env::var("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(port) = env::var("PORT") {
            if let Ok(val) = port.parse::<u16>() {
                config.port = val;
            }
        }

        config
    }

    pub fn access_token_expire(&self) -> Duration {
        Duration::minutes(self.access_token_expire_minutes)
    }

    pub fn refresh_token_expire(&self) -> Duration {
        Duration::days(self.refresh_token_expire_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_token_lifetimes() {
        let config = AppConfig::default();
        assert_eq!(config.access_token_expire(), Duration::minutes(60));
        assert_eq!(config.refresh_token_expire(), Duration::days(30));
    }
}
