//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{AppendHeaders, IntoResponse},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{LoginRequest, TokenResponse, User};
use super::passwords::verify_password;
use crate::common::{safe_email_log, ApiError, AppState};

/// POST /auth/login
/// Authenticates a user by email and password and sets the token cookies
///
/// # Request Body
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "..."
/// }
/// ```
///
/// On success both `access_token` and `refresh_token` cookies are set,
/// HttpOnly, with Max-Age equal to the respective token lifetime.
pub async fn login_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&payload.email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let Some(user) = user else {
        warn!(
            email = %safe_email_log(&payload.email),
            "Login failed: unknown email"
        );
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    };

    if !verify_password(&user.hashed_password, &payload.password).await? {
        warn!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            "Login failed: wrong password"
        );
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    }

    let access_token = state.token_service.issue_access(&user.email).map_err(|e| {
        error!(error = %e, user_id = %user.id, "JWT encoding error during login");
        ApiError::InternalServer("jwt error".to_string())
    })?;
    let refresh_token = state.token_service.issue_refresh(&user.email).map_err(|e| {
        error!(error = %e, user_id = %user.id, "JWT encoding error during login");
        ApiError::InternalServer("jwt error".to_string())
    })?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User login successful"
    );

    let cookies = AppendHeaders([
        (
            SET_COOKIE,
            auth_cookie(
                "access_token",
                &access_token,
                state.token_service.access_max_age(),
            )?,
        ),
        (
            SET_COOKIE,
            auth_cookie(
                "refresh_token",
                &refresh_token,
                state.token_service.refresh_max_age(),
            )?,
        ),
    ]);

    Ok((
        cookies,
        Json(serde_json::json!({ "message": "Login successful" })),
    ))
}

/// POST /auth/refresh
/// Rotates the token pair: a valid `refresh_token` cookie yields a new
/// access token AND a new refresh token, both re-set as cookies
pub async fn refresh_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let refresh_token = cookie_from_headers(&headers, "refresh_token").ok_or_else(|| {
        warn!("Refresh failed: missing refresh_token cookie");
        ApiError::Unauthorized("No refresh token provided".to_string())
    })?;

    let claims = state
        .token_service
        .decode(&refresh_token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    let new_access_token = state.token_service.issue_access(&claims.sub).map_err(|e| {
        error!(error = %e, "JWT encoding error during refresh");
        ApiError::InternalServer("jwt error".to_string())
    })?;
    let new_refresh_token = state.token_service.issue_refresh(&claims.sub).map_err(|e| {
        error!(error = %e, "JWT encoding error during refresh");
        ApiError::InternalServer("jwt error".to_string())
    })?;

    info!(
        subject = %safe_email_log(&claims.sub),
        "Token pair rotated via refresh"
    );

    let cookies = AppendHeaders([
        (
            SET_COOKIE,
            auth_cookie(
                "access_token",
                &new_access_token,
                state.token_service.access_max_age(),
            )?,
        ),
        (
            SET_COOKIE,
            auth_cookie(
                "refresh_token",
                &new_refresh_token,
                state.token_service.refresh_max_age(),
            )?,
        ),
    ]);

    Ok((cookies, Json(TokenResponse::bearer(new_access_token))))
}

/// POST /auth/logout
/// Clears both token cookies. The tokens themselves stay cryptographically
/// valid until expiry - there is no server-side revocation list.
pub async fn logout_handler(authed: AuthedUser) -> Result<impl IntoResponse, ApiError> {
    info!(user_id = %authed.id, "User logout successful");

    let cookies = AppendHeaders([
        (SET_COOKIE, clear_cookie("access_token")?),
        (SET_COOKIE, clear_cookie("refresh_token")?),
    ]);

    Ok((
        cookies,
        Json(serde_json::json!({ "message": "Logout successful" })),
    ))
}

/// GET /auth/verify
/// Confirms the session is valid and returns the caller's email
pub async fn verify_handler(authed: AuthedUser) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(serde_json::json!({
        "isAuthenticated": true,
        "email": authed.email,
    })))
}

// ---- Helper Functions ----

/// Build an HttpOnly auth cookie header value
pub(crate) fn auth_cookie(name: &str, value: &str, max_age: i64) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; Secure; SameSite=Lax",
        name, value, max_age
    ))
    .map_err(|_| ApiError::InternalServer("invalid cookie value".to_string()))
}

/// Expire a cookie immediately
fn clear_cookie(name: &str) -> Result<HeaderValue, ApiError> {
    auth_cookie(name, "", 0)
}

/// Extract a named cookie from a response-side HeaderMap
fn cookie_from_headers(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
