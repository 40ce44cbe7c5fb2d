//! Saved configuration handlers
//!
//! All access is scoped to the authenticated owner. Creation is capped per
//! subscription tier; the cap is evaluated against the live row count, so
//! deleting a configuration immediately frees a slot.

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::models::{Configuration, CreateConfigurationRequest, UpdateConfigurationRequest};
use super::validators::ConfigurationValidator;
use crate::auth::models::{SubscriptionTier, User};
use crate::auth::AuthedUser;
use crate::common::{generate_configuration_id, now_rfc3339, ApiError, AppState, Validator};

/// POST /configurations - Save a configuration for the authenticated user
pub async fn create_configuration(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateConfigurationRequest>,
) -> Result<Json<Configuration>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = ConfigurationValidator.validate(&request);
    if !validation.is_valid {
        warn!(
            user_id = %authed.id,
            errors = ?validation.errors,
            "Configuration creation validation failed"
        );
        return Err(validation.into());
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    let saved: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM configurations WHERE user_id = ?")
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let tier = SubscriptionTier::from_level(&user.subscription_level);
    if saved >= tier.config_limit() {
        warn!(
            user_id = %authed.id,
            saved = saved,
            limit = tier.config_limit(),
            "Configuration creation denied: tier cap reached"
        );
        return Err(ApiError::BadRequest(format!(
            "Configuration limit ({}) reached for subscription level {}",
            tier.config_limit(),
            tier.as_str()
        )));
    }

    let configuration_id = generate_configuration_id();
    let now = now_rfc3339();
    let config_data = request.config_data.to_string();

    sqlx::query(
        r#"
        INSERT INTO configurations (id, user_id, service, config_name, config_data, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&configuration_id)
    .bind(&authed.id)
    .bind(&request.service)
    .bind(&request.config_name)
    .bind(&config_data)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            configuration_id = %configuration_id,
            "Database error creating configuration"
        );
        ApiError::DatabaseError(e)
    })?;

    let configuration =
        sqlx::query_as::<_, Configuration>("SELECT * FROM configurations WHERE id = ?")
            .bind(&configuration_id)
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        configuration_id = %configuration_id,
        service = %request.service,
        "Configuration saved"
    );

    Ok(Json(configuration))
}

/// GET /configurations - List the caller's saved configurations
pub async fn list_configurations(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<Configuration>>, ApiError> {
    let state = state_lock.read().await.clone();

    let configurations = sqlx::query_as::<_, Configuration>(
        "SELECT * FROM configurations WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            "Database error listing configurations"
        );
        ApiError::DatabaseError(e)
    })?;

    debug!(
        user_id = %authed.id,
        configuration_count = configurations.len(),
        "Fetched saved configurations"
    );

    Ok(Json(configurations))
}

/// GET /configurations/:id - Fetch one configuration, owner-scoped
pub async fn get_configuration(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(configuration_id): Path<String>,
) -> Result<Json<Configuration>, ApiError> {
    let state = state_lock.read().await.clone();

    let configuration = owned_configuration(&state, &authed.id, &configuration_id).await?;
    Ok(Json(configuration))
}

/// PUT /configurations/:id - Rename or replace the stored form data
pub async fn update_configuration(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(configuration_id): Path<String>,
    Json(request): Json<UpdateConfigurationRequest>,
) -> Result<Json<Configuration>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = ConfigurationValidator.validate(&request);
    if !validation.is_valid {
        warn!(
            user_id = %authed.id,
            configuration_id = %configuration_id,
            errors = ?validation.errors,
            "Configuration update validation failed"
        );
        return Err(validation.into());
    }

    // Ownership check before the write
    owned_configuration(&state, &authed.id, &configuration_id).await?;

    sqlx::query(
        r#"
        UPDATE configurations
        SET config_name = COALESCE(?, config_name),
            config_data = COALESCE(?, config_data),
            updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(request.config_name.as_deref())
    .bind(request.config_data.as_ref().map(|v| v.to_string()))
    .bind(now_rfc3339())
    .bind(&configuration_id)
    .bind(&authed.id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            configuration_id = %configuration_id,
            "Database error updating configuration"
        );
        ApiError::DatabaseError(e)
    })?;

    let configuration = owned_configuration(&state, &authed.id, &configuration_id).await?;

    info!(
        user_id = %authed.id,
        configuration_id = %configuration_id,
        "Configuration updated"
    );

    Ok(Json(configuration))
}

/// DELETE /configurations/:id - Delete a configuration, owner-scoped
pub async fn delete_configuration(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(configuration_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM configurations WHERE id = ? AND user_id = ?")
        .bind(&configuration_id)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %authed.id,
                configuration_id = %configuration_id,
                "Database error deleting configuration"
            );
            ApiError::DatabaseError(e)
        })?;

    if result.rows_affected() == 0 {
        warn!(
            user_id = %authed.id,
            configuration_id = %configuration_id,
            "Configuration not found or access denied for deletion"
        );
        return Err(ApiError::NotFound("Configuration not found".to_string()));
    }

    info!(
        user_id = %authed.id,
        configuration_id = %configuration_id,
        "Configuration deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Load a configuration only if it belongs to the caller; anything else is a
/// 404, so foreign ids are indistinguishable from missing ones
async fn owned_configuration(
    state: &AppState,
    user_id: &str,
    configuration_id: &str,
) -> Result<Configuration, ApiError> {
    sqlx::query_as::<_, Configuration>(
        "SELECT * FROM configurations WHERE id = ? AND user_id = ?",
    )
    .bind(configuration_id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?
    .ok_or_else(|| ApiError::NotFound("Configuration not found".to_string()))
}
