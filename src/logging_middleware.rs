// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode
//!
//! Only JSON bodies are logged. Generated configuration files go out as
//! text/plain and can be large, so they are passed through untouched.

use axum::body::to_bytes;
use axum::{
    body::Body, extract::Request, http::header::CONTENT_TYPE, http::StatusCode, middleware::Next,
    response::Response,
};
use tracing::debug;

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %serde_json::to_string_pretty(&json).unwrap_or_default(),
                "Request"
            );
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            debug!(
                status = %parts.status,
                response_body = %serde_json::to_string_pretty(&json).unwrap_or_default(),
                "Response"
            );
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
