//! Tests for payments module
//!
//! These tests verify subscription-upgrade behavior:
//! - Webhook activation of the paid tier
//! - Order resolution from webhook payloads
//! - Owner scoping and request validation

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::extract::{Extension, Json, Path};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::auth::models::User;
    use crate::auth::{AuthedUser, TokenService};
    use crate::common::{migrations, parse_rfc3339, ApiError, AppConfig, AppState};
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

    async fn insert_user(state: &Arc<RwLock<AppState>>, id: &str) -> AuthedUser {
        let db = state.read().await.db.clone();
        let email = format!("{}@example.com", id.to_lowercase());
        sqlx::query(
            "INSERT INTO users (id, email, hashed_password, limit_reset_date) \
             VALUES (?, ?, 'x', '2099-01-01T00:00:00+00:00')",
        )
        .bind(id)
        .bind(&email)
        .execute(&db)
        .await
        .unwrap();

        AuthedUser {
            id: id.to_string(),
            email,
        }
    }

    async fn insert_order(state: &Arc<RwLock<AppState>>, order_id: &str, user_id: &str) {
        let db = state.read().await.db.clone();
        sqlx::query(
            "INSERT INTO payment_orders (order_id, user_id, plan, amount, status, payment_id, created_at) \
             VALUES (?, ?, 'paid', '499.00', 'created', ?, ?)",
        )
        .bind(order_id)
        .bind(user_id)
        .bind(format!("pay-{}", order_id))
        .bind(Utc::now().to_rfc3339())
        .execute(&db)
        .await
        .unwrap();
    }

    async fn fetch_user(state: &Arc<RwLock<AppState>>, id: &str) -> User {
        let db = state.read().await.db.clone();
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&db)
            .await
            .unwrap()
    }

    async fn fetch_order(state: &Arc<RwLock<AppState>>, order_id: &str) -> models::PaymentOrder {
        let db = state.read().await.db.clone();
        sqlx::query_as::<_, models::PaymentOrder>(
            "SELECT * FROM payment_orders WHERE order_id = ?",
        )
        .bind(order_id)
        .fetch_one(&db)
        .await
        .unwrap()
    }

    async fn webhook(
        state: &Arc<RwLock<AppState>>,
        payload: serde_json::Value,
    ) -> serde_json::Value {
        let Json(body) = handlers::webhook_handler(Extension(state.clone()), Json(payload))
            .await
            .unwrap();
        body
    }

    #[tokio::test]
    async fn test_succeeded_webhook_activates_paid_tier() {
        let state = test_state().await;
        let user = insert_user(&state, "U_BUYER1").await;
        insert_order(&state, "order-1", &user.id).await;

        let body = webhook(
            &state,
            json!({
                "object": {
                    "id": "pay-order-1",
                    "status": "succeeded",
                    "metadata": { "order_id": "order-1" },
                }
            }),
        )
        .await;
        assert_eq!(body["ok"], true);

        let upgraded = fetch_user(&state, &user.id).await;
        assert_eq!(upgraded.subscription_level, "paid");
        assert_eq!(upgraded.request_limit, 60);

        let expiry = parse_rfc3339(upgraded.subscription_expiry.as_deref().unwrap()).unwrap();
        let expected = Utc::now() + Duration::days(30);
        assert!((expected - expiry).num_seconds().abs() < 60);

        assert_eq!(fetch_order(&state, "order-1").await.status, "succeeded");
    }

    #[tokio::test]
    async fn test_webhook_resolves_order_by_payment_id() {
        let state = test_state().await;
        let user = insert_user(&state, "U_BUYER2").await;
        insert_order(&state, "order-2", &user.id).await;

        // No metadata block; only the gateway payment id
        webhook(
            &state,
            json!({ "object": { "id": "pay-order-2", "status": "succeeded" } }),
        )
        .await;

        assert_eq!(fetch_user(&state, &user.id).await.subscription_level, "paid");
    }

    #[tokio::test]
    async fn test_webhook_for_unknown_order_is_acknowledged() {
        let state = test_state().await;
        let body = webhook(
            &state,
            json!({ "object": { "id": "pay-nowhere", "status": "succeeded" } }),
        )
        .await;
        assert_eq!(body["error"], "Unknown order");
    }

    #[tokio::test]
    async fn test_canceled_webhook_leaves_user_on_free_tier() {
        let state = test_state().await;
        let user = insert_user(&state, "U_BUYER3").await;
        insert_order(&state, "order-3", &user.id).await;

        webhook(
            &state,
            json!({
                "object": {
                    "id": "pay-order-3",
                    "status": "canceled",
                    "metadata": { "order_id": "order-3" },
                }
            }),
        )
        .await;

        let unchanged = fetch_user(&state, &user.id).await;
        assert_eq!(unchanged.subscription_level, "free");
        assert_eq!(unchanged.request_limit, 15);
        assert_eq!(fetch_order(&state, "order-3").await.status, "canceled");
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_plan_and_bad_amount() {
        let state = test_state().await;
        let user = insert_user(&state, "U_BUYER4").await;

        let result = handlers::create_payment_handler(
            Extension(state.clone()),
            AuthedUser {
                id: user.id.clone(),
                email: user.email.clone(),
            },
            Json(models::PayRequest {
                amount: "499.00".to_string(),
                plan: "platinum".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        let result = handlers::create_payment_handler(
            Extension(state.clone()),
            AuthedUser {
                id: user.id.clone(),
                email: user.email.clone(),
            },
            Json(models::PayRequest {
                amount: "-1".to_string(),
                plan: "paid".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_stores_nothing_when_gateway_is_unconfigured() {
        let state = test_state().await;
        let user = insert_user(&state, "U_BUYER5").await;

        let result = handlers::create_payment_handler(
            Extension(state.clone()),
            AuthedUser {
                id: user.id.clone(),
                email: user.email,
            },
            Json(models::PayRequest {
                amount: "499.00".to_string(),
                plan: "paid".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::PaymentError(_))));

        let db = state.read().await.db.clone();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment_orders")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_order_status_is_owner_scoped() {
        let state = test_state().await;
        let owner = insert_user(&state, "U_BUYER6").await;
        let other = insert_user(&state, "U_SNOOP1").await;
        insert_order(&state, "order-6", &owner.id).await;

        let result = handlers::payment_status_handler(
            Extension(state.clone()),
            AuthedUser {
                id: other.id,
                email: other.email,
            },
            Path("order-6".to_string()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_listing_is_owner_scoped() {
        let state = test_state().await;
        let owner = insert_user(&state, "U_BUYER7").await;
        let other = insert_user(&state, "U_BUYER8").await;
        insert_order(&state, "order-7", &owner.id).await;
        insert_order(&state, "order-8", &other.id).await;

        let Json(orders) = handlers::list_payments_handler(
            Extension(state.clone()),
            AuthedUser {
                id: owner.id.clone(),
                email: owner.email,
            },
        )
        .await
        .unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_id, "order-7");
    }
}
