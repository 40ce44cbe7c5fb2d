// src/services/quota.rs
//! Monthly generation-request quota bookkeeping
//!
//! The reset is evaluated lazily at check time instead of by a background
//! sweep, so an elapsed window only becomes visible on the next access
//! attempt. Consumption is a single conditional UPDATE, which keeps the
//! counter from ever exceeding the limit under concurrent requests.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::models::User;
use crate::common::helpers::parse_rfc3339;

/// Length of one billing window
const RESET_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct QuotaService {
    db: SqlitePool,
}

impl QuotaService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Zero the monthly counter and advance the reset date once the current
    /// window has elapsed. Calling while the window is still open is a no-op.
    ///
    /// An unparseable reset date counts as elapsed, so a corrupt column heals
    /// itself on the next check.
    pub async fn reset_if_elapsed(&self, user: &User) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        let elapsed = parse_rfc3339(&user.limit_reset_date).map_or(true, |reset| now >= reset);
        if !elapsed {
            return Ok(());
        }

        let next_reset = (now + Duration::days(RESET_WINDOW_DAYS)).to_rfc3339();
        sqlx::query("UPDATE users SET requests_this_month = 0, limit_reset_date = ? WHERE id = ?")
            .bind(&next_reset)
            .bind(&user.id)
            .execute(&self.db)
            .await?;

        info!(
            user_id = %user.id,
            next_reset = %next_reset,
            "Monthly request counter reset"
        );
        Ok(())
    }

    /// Whether the user may perform another generation request
    ///
    /// Unknown users are denied. The lazy reset runs first, so an elapsed
    /// window is settled before the limit is evaluated.
    pub async fn check_limit(&self, user_id: &str) -> Result<bool, sqlx::Error> {
        let Some(user) = self.load(user_id).await? else {
            return Ok(false);
        };

        self.reset_if_elapsed(&user).await?;

        // Re-read: the reset may have zeroed the counter
        let Some(user) = self.load(user_id).await? else {
            return Ok(false);
        };
        Ok(user.requests_this_month < user.request_limit)
    }

    /// Record one consumed request, but only while the counter is still below
    /// the limit. Returns whether a request was actually consumed.
    ///
    /// The conditional UPDATE closes the check-then-act race between
    /// concurrent requests from the same user: the counter cannot be pushed
    /// past the limit no matter how the checks interleave.
    pub async fn consume(&self, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET requests_this_month = requests_this_month + 1 \
             WHERE id = ? AND requests_this_month < request_limit",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn load(&self, user_id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations;

    async fn create_test_service() -> QuotaService {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        QuotaService::new(pool)
    }

    async fn insert_user(
        service: &QuotaService,
        id: &str,
        requests_this_month: i64,
        request_limit: i64,
        limit_reset_date: &str,
    ) {
        sqlx::query(
            "INSERT INTO users (id, email, hashed_password, request_limit, requests_this_month, limit_reset_date) \
             VALUES (?, ?, 'x', ?, ?, ?)",
        )
        .bind(id)
        .bind(format!("{}@example.com", id))
        .bind(request_limit)
        .bind(requests_this_month)
        .bind(limit_reset_date)
        .execute(&service.db)
        .await
        .unwrap();
    }

    async fn fetch_user(service: &QuotaService, id: &str) -> User {
        service.load(id).await.unwrap().unwrap()
    }

    fn future_reset() -> String {
        (Utc::now() + Duration::days(10)).to_rfc3339()
    }

    #[tokio::test]
    async fn test_check_limit_allows_below_limit() {
        let service = create_test_service().await;
        insert_user(&service, "U_TEST01", 0, 15, &future_reset()).await;

        assert!(service.check_limit("U_TEST01").await.unwrap());
    }

    #[tokio::test]
    async fn test_check_limit_denies_at_limit() {
        let service = create_test_service().await;
        insert_user(&service, "U_TEST02", 15, 15, &future_reset()).await;

        assert!(!service.check_limit("U_TEST02").await.unwrap());

        // Quota stays untouched by the denied check
        let user = fetch_user(&service, "U_TEST02").await;
        assert_eq!(user.requests_this_month, 15);
    }

    #[tokio::test]
    async fn test_check_limit_denies_unknown_user() {
        let service = create_test_service().await;

        assert!(!service.check_limit("U_MISSING").await.unwrap());
        assert!(!service.consume("U_MISSING").await.unwrap());
    }

    #[tokio::test]
    async fn test_check_then_consume_increments_by_exactly_one() {
        let service = create_test_service().await;
        let reset = future_reset();
        insert_user(&service, "U_TEST03", 7, 15, &reset).await;

        assert!(service.check_limit("U_TEST03").await.unwrap());
        assert!(service.consume("U_TEST03").await.unwrap());

        let user = fetch_user(&service, "U_TEST03").await;
        assert_eq!(user.requests_this_month, 8);
        // No reset happened mid-sequence
        assert_eq!(user.limit_reset_date, reset);
    }

    #[tokio::test]
    async fn test_elapsed_window_resets_before_evaluation() {
        let service = create_test_service().await;
        let stale = (Utc::now() - Duration::days(1)).to_rfc3339();
        insert_user(&service, "U_TEST04", 15, 15, &stale).await;

        // At the limit, but the window elapsed: the reset must run first
        assert!(service.check_limit("U_TEST04").await.unwrap());

        let user = fetch_user(&service, "U_TEST04").await;
        assert_eq!(user.requests_this_month, 0);

        let new_reset = parse_rfc3339(&user.limit_reset_date).unwrap();
        let expected = Utc::now() + Duration::days(RESET_WINDOW_DAYS);
        assert!((expected - new_reset).num_seconds().abs() < 60);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent_within_window() {
        let service = create_test_service().await;
        insert_user(&service, "U_TEST05", 3, 15, &future_reset()).await;

        let user = fetch_user(&service, "U_TEST05").await;
        service.reset_if_elapsed(&user).await.unwrap();

        let after = fetch_user(&service, "U_TEST05").await;
        assert_eq!(after.requests_this_month, 3);
        assert_eq!(after.limit_reset_date, user.limit_reset_date);
    }

    #[tokio::test]
    async fn test_consume_stops_at_limit() {
        let service = create_test_service().await;
        insert_user(&service, "U_TEST06", 14, 15, &future_reset()).await;

        assert!(service.consume("U_TEST06").await.unwrap());
        assert!(!service.consume("U_TEST06").await.unwrap());

        let user = fetch_user(&service, "U_TEST06").await;
        assert_eq!(user.requests_this_month, 15);
    }
}
