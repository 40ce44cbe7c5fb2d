//! Tests for account module
//!
//! These tests verify the email-code account lifecycle:
//! - Registration request/verify against a real in-memory database
//! - Code purging, expiry and single-use consumption
//! - Password reset round trip

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::extract::{Extension, Json};
    use chrono::{Duration, Utc};
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::auth::models::User;
    use crate::auth::passwords::verify_password;
    use crate::auth::TokenService;
    use crate::common::{migrations, ApiError, AppConfig, AppState};
    use crate::services::{EmailService, PaymentService, QuotaService};

    async fn test_state() -> Arc<RwLock<AppState>> {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let config = AppConfig::default();
        let http = reqwest::Client::new();
        let state = AppState {
            db: pool.clone(),
            http: http.clone(),
            config: config.clone(),
            token_service: Arc::new(TokenService::new(&config)),
            quota_service: Arc::new(QuotaService::new(pool.clone())),
            email_service: Arc::new(EmailService::new(&config)),
            payment_service: Arc::new(PaymentService::new(http, &config)),
        };
        Arc::new(RwLock::new(state))
    }

    async fn stored_code(state: &Arc<RwLock<AppState>>, email: &str) -> Option<models::VerificationCode> {
        let db = state.read().await.db.clone();
        sqlx::query_as::<_, models::VerificationCode>(
            "SELECT * FROM verification_codes WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&db)
        .await
        .unwrap()
    }

    async fn stored_user(state: &Arc<RwLock<AppState>>, email: &str) -> Option<User> {
        let db = state.read().await.db.clone();
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&db)
            .await
            .unwrap()
    }

    async fn request_code(state: &Arc<RwLock<AppState>>, email: &str, password: &str) {
        handlers::request_code_handler(
            Extension(state.clone()),
            Json(models::RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
        .expect("code request should succeed");
    }

    async fn verify(
        state: &Arc<RwLock<AppState>>,
        email: &str,
        code: &str,
    ) -> Result<Json<models::MessageResponse>, ApiError> {
        handlers::verify_code_handler(
            Extension(state.clone()),
            Json(models::VerifyCodeRequest {
                email: email.to_string(),
                code: code.to_string(),
            }),
        )
        .await
    }

    async fn register(state: &Arc<RwLock<AppState>>, email: &str, password: &str) -> User {
        request_code(state, email, password).await;
        let code = stored_code(state, email).await.unwrap().code;
        verify(state, email, &code).await.unwrap();
        stored_user(state, email).await.unwrap()
    }

    #[tokio::test]
    async fn test_request_code_stores_pending_credential() {
        let state = test_state().await;
        request_code(&state, "a@x.com", "password123").await;

        let entry = stored_code(&state, "a@x.com").await.expect("code stored");
        assert_eq!(entry.code.len(), 6);
        assert!(entry.code.chars().all(|c| c.is_ascii_digit()));
        // The pending credential is a hash, never the plaintext
        assert!(verify_password(&entry.password_hash, "password123")
            .await
            .unwrap());

        // No user yet
        assert!(stored_user(&state, "a@x.com").await.is_none());
    }

    #[tokio::test]
    async fn test_new_code_replaces_previous_one() {
        let state = test_state().await;
        request_code(&state, "a@x.com", "password123").await;
        let first = stored_code(&state, "a@x.com").await.unwrap();

        request_code(&state, "a@x.com", "password456").await;
        let second = stored_code(&state, "a@x.com").await.unwrap();

        // One live code per email: the second request replaced the row
        assert!(verify_password(&second.password_hash, "password456")
            .await
            .unwrap());
        assert!(first.code != second.code || first.password_hash != second.password_hash);
    }

    #[tokio::test]
    async fn test_correct_code_creates_user_and_consumes_code() {
        let state = test_state().await;
        let user = register(&state, "a@x.com", "password123").await;

        assert!(user.id.starts_with("U_"));
        assert_eq!(user.subscription_level, "free");
        assert_eq!(user.request_limit, 15);
        assert_eq!(user.requests_this_month, 0);
        assert!(verify_password(&user.hashed_password, "password123")
            .await
            .unwrap());

        assert!(stored_code(&state, "a@x.com").await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_code_leaves_user_absent() {
        let state = test_state().await;
        request_code(&state, "a@x.com", "password123").await;

        let result = verify(&state, "a@x.com", "000000").await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        assert!(stored_user(&state, "a@x.com").await.is_none());
        // The code survives a failed attempt
        assert!(stored_code(&state, "a@x.com").await.is_some());
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let state = test_state().await;
        request_code(&state, "a@x.com", "password123").await;
        let code = stored_code(&state, "a@x.com").await.unwrap().code;

        let db = state.read().await.db.clone();
        sqlx::query("UPDATE verification_codes SET expires_at = ? WHERE email = ?")
            .bind((Utc::now() - Duration::minutes(1)).to_rfc3339())
            .bind("a@x.com")
            .execute(&db)
            .await
            .unwrap();

        let result = verify(&state, "a@x.com", &code).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        assert!(stored_user(&state, "a@x.com").await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let state = test_state().await;
        register(&state, "a@x.com", "password123").await;

        let result = handlers::request_code_handler(
            Extension(state.clone()),
            Json(models::RegisterRequest {
                email: "a@x.com".to_string(),
                password: "password456".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_short_password_is_rejected_before_any_write() {
        let state = test_state().await;
        let result = handlers::request_code_handler(
            Extension(state.clone()),
            Json(models::RegisterRequest {
                email: "a@x.com".to_string(),
                password: "short".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::ValidationError(_))));
        assert!(stored_code(&state, "a@x.com").await.is_none());
    }

    #[tokio::test]
    async fn test_password_reset_round_trip() {
        let state = test_state().await;
        register(&state, "a@x.com", "password123").await;

        handlers::reset_request_handler(
            Extension(state.clone()),
            Json(models::PasswordResetRequest {
                email: "a@x.com".to_string(),
            }),
        )
        .await
        .unwrap();

        let code = stored_code(&state, "a@x.com").await.unwrap().code;

        handlers::reset_confirm_handler(
            Extension(state.clone()),
            Json(models::PasswordResetConfirm {
                email: "a@x.com".to_string(),
                code,
                new_password: "replacement99".to_string(),
                confirm_password: "replacement99".to_string(),
            }),
        )
        .await
        .unwrap();

        let user = stored_user(&state, "a@x.com").await.unwrap();
        assert!(verify_password(&user.hashed_password, "replacement99")
            .await
            .unwrap());
        assert!(!verify_password(&user.hashed_password, "password123")
            .await
            .unwrap());
        assert!(stored_code(&state, "a@x.com").await.is_none());
    }

    #[tokio::test]
    async fn test_password_reset_for_unknown_email_is_not_found() {
        let state = test_state().await;
        let result = handlers::reset_request_handler(
            Extension(state.clone()),
            Json(models::PasswordResetRequest {
                email: "nobody@x.com".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_password_reset_mismatch_is_rejected() {
        let state = test_state().await;
        register(&state, "a@x.com", "password123").await;

        let result = handlers::reset_confirm_handler(
            Extension(state.clone()),
            Json(models::PasswordResetConfirm {
                email: "a@x.com".to_string(),
                code: "123456".to_string(),
                new_password: "replacement99".to_string(),
                confirm_password: "different999".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        // Password unchanged
        let user = stored_user(&state, "a@x.com").await.unwrap();
        assert!(verify_password(&user.hashed_password, "password123")
            .await
            .unwrap());
    }
}
