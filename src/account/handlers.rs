//! Account lifecycle handlers
//!
//! Registration and password reset both run through mailed 6-digit codes.
//! Email delivery is best-effort: a failed send is logged and the flow
//! proceeds, so the caller cannot distinguish a dead mailbox from a slow one.

use axum::extract::{Extension, Json};
use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{
    MessageResponse, PasswordResetConfirm, PasswordResetRequest, RegisterRequest,
    VerificationCode, VerifyCodeRequest,
};
use super::validators::{PasswordResetConfirmValidator, RegisterValidator};
use crate::auth::models::User;
use crate::auth::passwords::hash_password;
use crate::auth::AuthedUser;
use crate::common::{generate_user_id, parse_rfc3339, safe_email_log, ApiError, AppState, Validator};
use crate::services::email::{password_reset_email_body, verification_email_body};

/// How long a mailed code stays usable
const CODE_TTL_MINUTES: i64 = 10;

/// Days until a fresh account's first quota reset
const INITIAL_RESET_WINDOW_DAYS: i64 = 30;

/// POST /register/request-code
/// Starts registration: stores a pending password hash keyed by email and
/// mails a 6-digit confirmation code. 409 when the email is already taken.
pub async fn request_code_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = RegisterValidator.validate(&payload);
    if !validation.is_valid {
        warn!(
            email = %safe_email_log(&payload.email),
            errors = ?validation.errors,
            "Registration request validation failed"
        );
        return Err(validation.into());
    }

    if user_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(
            email = %safe_email_log(&payload.email),
            "Registration rejected: email already registered"
        );
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    // The plaintext password never touches the database: only its hash waits
    // alongside the code until the email is confirmed
    let password_hash = hash_password(&payload.password).await?;
    let code = generate_verification_code();
    store_verification_code(&state.db, &payload.email, &code, &password_hash).await?;

    if let Err(e) = state
        .email_service
        .send(
            &payload.email,
            &format!("Your code: {} | Confirm your registration", code),
            &verification_email_body(&code),
        )
        .await
    {
        warn!(
            error = %e,
            email = %safe_email_log(&payload.email),
            "Verification email could not be sent"
        );
    }

    info!(
        email = %safe_email_log(&payload.email),
        "Registration verification code issued"
    );

    Ok(Json(MessageResponse::new("Verification code sent to email")))
}

/// POST /register/verify
/// Completes registration: the correct code turns the pending credential
/// into a User on the free tier and consumes the code.
pub async fn verify_code_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<VerifyCodeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let entry = live_verification_code(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(
                email = %safe_email_log(&payload.email),
                "Registration verify failed: no live code"
            );
            ApiError::BadRequest("No verification request found or code expired".to_string())
        })?;

    if entry.code != payload.code {
        warn!(
            email = %safe_email_log(&payload.email),
            "Registration verify failed: wrong code"
        );
        return Err(ApiError::BadRequest("Invalid verification code".to_string()));
    }

    if user_by_email(&state.db, &payload.email).await?.is_some() {
        delete_verification_code(&state.db, &payload.email).await?;
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let user_id = generate_user_id();
    let limit_reset_date = (Utc::now() + Duration::days(INITIAL_RESET_WINDOW_DAYS)).to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, email, hashed_password, limit_reset_date) VALUES (?, ?, ?, ?)",
    )
    .bind(&user_id)
    .bind(&payload.email)
    .bind(&entry.password_hash)
    .bind(&limit_reset_date)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            email = %safe_email_log(&payload.email),
            "Database error creating user"
        );
        ApiError::DatabaseError(e)
    })?;

    delete_verification_code(&state.db, &payload.email).await?;

    info!(
        user_id = %user_id,
        email = %safe_email_log(&payload.email),
        "User registered"
    );

    Ok(Json(MessageResponse::new("User successfully registered")))
}

/// POST /password/reset/request
/// Issues a reset code for an existing account. 404 when the email is
/// unknown.
pub async fn reset_request_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = user_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(
                email = %safe_email_log(&payload.email),
                "Password reset requested for unknown email"
            );
            ApiError::NotFound("User not found".to_string())
        })?;

    // The code row keeps the user's current hash; the replacement password is
    // only hashed once the code checks out
    let code = generate_verification_code();
    store_verification_code(&state.db, &payload.email, &code, &user.hashed_password).await?;

    if let Err(e) = state
        .email_service
        .send(
            &payload.email,
            &format!("Your code: {} | Password reset", code),
            &password_reset_email_body(&code),
        )
        .await
    {
        warn!(
            error = %e,
            email = %safe_email_log(&payload.email),
            "Password reset email could not be sent"
        );
    }

    info!(
        user_id = %user.id,
        email = %safe_email_log(&payload.email),
        "Password reset code issued"
    );

    Ok(Json(MessageResponse::new("Password reset code sent to email")))
}

/// POST /password/reset/confirm
/// Sets the new password once the mailed code matches and the two password
/// fields agree.
pub async fn reset_confirm_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<PasswordResetConfirm>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.new_password != payload.confirm_password {
        return Err(ApiError::BadRequest("Passwords do not match".to_string()));
    }

    let validation = PasswordResetConfirmValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let entry = live_verification_code(&state.db, &payload.email).await?;
    let valid = entry.map_or(false, |e| e.code == payload.code);
    if !valid {
        warn!(
            email = %safe_email_log(&payload.email),
            "Password reset confirm failed: invalid or expired code"
        );
        return Err(ApiError::BadRequest(
            "Invalid or expired verification code".to_string(),
        ));
    }

    let user = user_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let new_hash = hash_password(&payload.new_password).await?;
    sqlx::query("UPDATE users SET hashed_password = ? WHERE id = ?")
        .bind(&new_hash)
        .bind(&user.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    delete_verification_code(&state.db, &payload.email).await?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&payload.email),
        "Password reset completed"
    );

    Ok(Json(MessageResponse::new("Password successfully reset")))
}

/// GET /account/info
/// Identity, subscription and quota counters for the profile page
pub async fn account_info_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "id": user.id,
        "email": user.email,
        "subscription_level": user.subscription_level,
        "subscription_expiry": user.subscription_expiry,
        "requests_this_month": user.requests_this_month,
        "request_limit": user.request_limit,
        "limit_reset_date": user.limit_reset_date,
    })))
}

// ---- Helper Functions ----

/// 6-digit numeric code
fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

async fn user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)
}

/// Purge-and-insert keeps at most one live code per email
async fn store_verification_code(
    db: &SqlitePool,
    email: &str,
    code: &str,
    password_hash: &str,
) -> Result<(), ApiError> {
    let expires_at = (Utc::now() + Duration::minutes(CODE_TTL_MINUTES)).to_rfc3339();

    sqlx::query("DELETE FROM verification_codes WHERE email = ?")
        .bind(email)
        .execute(db)
        .await
        .map_err(ApiError::DatabaseError)?;

    sqlx::query(
        "INSERT INTO verification_codes (email, code, password_hash, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(email)
    .bind(code)
    .bind(password_hash)
    .bind(&expires_at)
    .execute(db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(())
}

/// Load the live code for an email; expired rows are filtered out on read
/// rather than swept by a background job
async fn live_verification_code(
    db: &SqlitePool,
    email: &str,
) -> Result<Option<VerificationCode>, ApiError> {
    let entry = sqlx::query_as::<_, VerificationCode>(
        "SELECT * FROM verification_codes WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db)
    .await
    .map_err(ApiError::DatabaseError)?;

    // An unparseable expiry counts as expired
    Ok(entry.filter(|e| parse_rfc3339(&e.expires_at).map_or(false, |exp| exp > Utc::now())))
}

async fn delete_verification_code(db: &SqlitePool, email: &str) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM verification_codes WHERE email = ?")
        .bind(email)
        .execute(db)
        .await
        .map_err(ApiError::DatabaseError)?;
    Ok(())
}
