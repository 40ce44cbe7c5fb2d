//! Generation pipeline handlers
//!
//! One generic handler drives every supported service:
//! auth -> quota check -> validate -> render -> commit.

use axum::{
    extract::{Extension, Json, Path},
    http::header,
    response::IntoResponse,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::metadata::{apply_defaults, derive_form_metadata, validate_required};
use super::registry;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::services::render::render_template;

/// GET /form-metadata/:service
/// Form descriptor for the service's configuration schema; read-only schema
/// introspection, so no auth is required
pub async fn form_metadata_handler(
    Path(service): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let schema = registry::lookup(&service)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown service: {}", service)))?;

    Ok(Json(derive_form_metadata(schema)))
}

/// GET /services
/// Summary of every supported service, for the service picker UI
pub async fn list_services_handler() -> impl IntoResponse {
    let services: Vec<_> = registry::SERVICES
        .iter()
        .map(|schema| {
            serde_json::json!({
                "id": schema.service,
                "name": schema.display_name,
                "description": schema.description,
                "file_extension": schema.file_extension,
            })
        })
        .collect();

    Json(services)
}

/// POST /generate/:service
/// Runs the generation pipeline and returns the rendered configuration as
/// text/plain. 401 without a session, 403 once the monthly quota is spent,
/// 400 when required fields are missing.
pub async fn generate_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(service): Path<String>,
    user: AuthedUser,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let schema = registry::lookup(&service)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown service: {}", service)))?;

    let state = state_lock.read().await.clone();

    // Quota gate
    let allowed = state
        .quota_service
        .check_limit(&user.id)
        .await
        .map_err(ApiError::DatabaseError)?;
    if !allowed {
        warn!(
            user_id = %user.id,
            service = %service,
            "Generation denied: request limit exceeded"
        );
        return Err(ApiError::QuotaExceeded("Request limit exceeded".to_string()));
    }

    // Validate
    let Value::Object(mut fields) = payload else {
        return Err(ApiError::BadRequest(
            "Configuration must be a JSON object".to_string(),
        ));
    };
    let validation = validate_required(schema, &fields);
    if !validation.is_valid {
        return Err(validation.into());
    }
    apply_defaults(schema, &mut fields);

    // Render; failures here are internal errors, never user input errors
    let rendered = render_template(schema.template, &fields)
        .map_err(|e| ApiError::TemplateError(e.to_string()))?;

    // Commit: the request is counted only after a successful render, so a
    // failed render leaves the quota untouched. The conditional consume also
    // keeps concurrent requests from pushing the counter past the limit.
    let consumed = state
        .quota_service
        .consume(&user.id)
        .await
        .map_err(ApiError::DatabaseError)?;
    if !consumed {
        warn!(
            user_id = %user.id,
            service = %service,
            "Generation denied at commit: request limit exceeded"
        );
        return Err(ApiError::QuotaExceeded("Request limit exceeded".to_string()));
    }

    info!(user_id = %user.id, service = %service, "Configuration generated");

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        rendered,
    ))
}
