//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Token round-trips through the TokenService
//! - Rejection of tampered and expired tokens
//! - Subscription tier limits
//! - Auth cookie shape

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::AppConfig;
    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    fn test_service() -> TokenService {
        let config = AppConfig {
            jwt_secret: "test_secret_key".to_string(),
            ..AppConfig::default()
        };
        TokenService::new(&config)
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_service();

        let token = service.issue_access("user@example.com").unwrap();
        let claims = service.decode(&token).expect("fresh token should decode");

        assert_eq!(claims.sub, "user@example.com");
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let service = test_service();

        let access = service.issue_access("user@example.com").unwrap();
        let refresh = service.issue_refresh("user@example.com").unwrap();

        let access_claims = service.decode(&access).unwrap();
        let refresh_claims = service.decode(&refresh).unwrap();

        assert!(refresh_claims.exp > access_claims.exp);
        assert_eq!(service.access_max_age(), 60 * 60);
        assert_eq!(service.refresh_max_age(), 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let service = test_service();

        let other = TokenService::new(&AppConfig {
            jwt_secret: "a_different_secret".to_string(),
            ..AppConfig::default()
        });
        let token = other.issue_access("user@example.com").unwrap();

        assert!(service.decode(&token).is_none());
    }

    #[test]
    fn test_decode_rejects_tampered_signature() {
        let service = test_service();

        let mut token = service.issue_access("user@example.com").unwrap();
        // Flip a character in the signature segment
        let flipped = if token.ends_with('A') { 'B' } else { 'A' };
        token.pop();
        token.push(flipped);

        assert!(service.decode(&token).is_none());
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let service = test_service();

        // Hand-craft a token with the right secret but an expiry in the past,
        // beyond the default validation leeway
        let claims = models::Claims {
            sub: "user@example.com".to_string(),
            exp: (Utc::now().timestamp() - 3600) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test_secret_key".as_bytes()),
        )
        .unwrap();

        assert!(service.decode(&token).is_none());
    }

    #[test]
    fn test_decode_rejects_malformed_token() {
        let service = test_service();
        assert!(service.decode("not-a-jwt").is_none());
        assert!(service.decode("").is_none());
    }

    #[test]
    fn test_subscription_tier_limits() {
        assert_eq!(SubscriptionTier::Free.request_limit(), 15);
        assert_eq!(SubscriptionTier::Paid.request_limit(), 60);
        assert_eq!(SubscriptionTier::Free.config_limit(), 5);
        assert_eq!(SubscriptionTier::Paid.config_limit(), 25);

        assert_eq!(SubscriptionTier::from_level("paid"), SubscriptionTier::Paid);
        assert_eq!(SubscriptionTier::from_level("free"), SubscriptionTier::Free);
        assert_eq!(
            SubscriptionTier::from_level("something-else"),
            SubscriptionTier::Free
        );
    }

    #[test]
    fn test_auth_cookie_shape() {
        let cookie = handlers::auth_cookie("access_token", "abc123", 3600).unwrap();
        let value = cookie.to_str().unwrap();

        assert!(value.starts_with("access_token=abc123;"));
        assert!(value.contains("Max-Age=3600"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Lax"));
    }
}
