//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::COOKIE, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::User;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Resolves the caller's identity from the `access_token` cookie: decodes the
/// JWT, then loads the user record the subject claim points at. Read-only -
/// there is no refresh-token fallback here, refresh is its own endpoint.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let token = match cookie_value(parts, "access_token") {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing access_token cookie");
                return Err(ApiError::Unauthorized("Token is required".to_string()));
            }
        };

        let claims = match app_state.token_service.decode(&token) {
            Some(claims) => claims,
            None => {
                return Err(ApiError::Unauthorized("Invalid token".to_string()));
            }
        };

        // The subject claim is the user's email
        let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(&claims.sub)
            .fetch_optional(&app_state.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    subject = %safe_email_log(&claims.sub),
                    "Database error during user lookup in authentication"
                );
                ApiError::DatabaseError(e)
            })?;

        match user {
            Some(u) => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser {
                    id: u.id,
                    email: u.email,
                })
            }
            None => {
                warn!(
                    subject = %safe_email_log(&claims.sub),
                    "Authentication failed: user not found in database"
                );
                Err(ApiError::Unauthorized("User not found".to_string()))
            }
        }
    }
}

/// Extract a named cookie from the request's Cookie header
pub(crate) fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    let header = parts.headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
