// src/services/render.rs
//! Configuration template engine
//!
//! `render_template(template, context)` is a pure function from a validated
//! field map to rendered configuration text. Templates are plain Rust
//! formatting, one render function per template id, the same way the email
//! bodies are produced.

use serde_json::{Map, Value};

use crate::generator::schemas;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("template rendering failed: {0}")]
    Render(String),
}

/// Render a named template against a field map
pub fn render_template(
    template: &str,
    context: &Map<String, Value>,
) -> Result<String, TemplateError> {
    match template {
        "nginx.conf" => schemas::nginx::render(context),
        "dockerfile" => schemas::dockerfile::render(context),
        "docker-compose.yml" => schemas::compose::render(context),
        "systemd.service" => schemas::systemd::render(context),
        "apache.conf" => schemas::apache::render(context),
        "postgresql.conf" => schemas::postgresql::render(context),
        "sshd_config" => schemas::sshd::render(context),
        "redis.conf" => schemas::redis::render(context),
        other => Err(TemplateError::NotFound(other.to_string())),
    }
}

// ---- Context accessors shared by the render functions ----

/// Required string field; rendering fails if it is missing or not a string
pub fn ctx_str<'a>(ctx: &'a Map<String, Value>, name: &str) -> Result<&'a str, TemplateError> {
    ctx.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| TemplateError::Render(format!("missing string field `{}`", name)))
}

/// Optional string field; absent, null, empty and non-string values yield None
pub fn ctx_opt_str<'a>(ctx: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    ctx.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Required integer field
pub fn ctx_i64(ctx: &Map<String, Value>, name: &str) -> Result<i64, TemplateError> {
    ctx.get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| TemplateError::Render(format!("missing integer field `{}`", name)))
}

/// Optional integer field
pub fn ctx_opt_i64(ctx: &Map<String, Value>, name: &str) -> Option<i64> {
    ctx.get(name).and_then(Value::as_i64)
}

/// Boolean toggle; absent or non-boolean counts as off
pub fn ctx_bool(ctx: &Map<String, Value>, name: &str) -> bool {
    ctx.get(name).and_then(Value::as_bool).unwrap_or(false)
}

/// Optional boolean; absent and non-boolean values yield None
pub fn ctx_opt_bool(ctx: &Map<String, Value>, name: &str) -> Option<bool> {
    ctx.get(name).and_then(Value::as_bool)
}

/// List field rendered as strings; non-string entries are stringified
pub fn ctx_str_list(ctx: &Map<String, Value>, name: &str) -> Vec<String> {
    ctx.get(name)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(value_to_string).collect())
        .unwrap_or_default()
}

/// Mapping field
pub fn ctx_dict<'a>(ctx: &'a Map<String, Value>, name: &str) -> Option<&'a Map<String, Value>> {
    ctx.get(name).and_then(Value::as_object)
}

/// Raw array field, for structured sub-objects
pub fn ctx_array<'a>(ctx: &'a Map<String, Value>, name: &str) -> Option<&'a Vec<Value>> {
    ctx.get(name).and_then(Value::as_array)
}

/// Render a JSON scalar without quotes around strings
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_template_is_not_found() {
        let ctx = Map::new();
        let result = render_template("no-such-template", &ctx);
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_context_accessors() {
        let Value::Object(ctx) = json!({
            "name": "web",
            "port": 8080,
            "enabled": true,
            "empty": "",
            "tags": ["a", 1, true],
        }) else {
            panic!("literal should be an object");
        };

        assert_eq!(ctx_str(&ctx, "name").unwrap(), "web");
        assert!(ctx_str(&ctx, "missing").is_err());
        assert_eq!(ctx_opt_str(&ctx, "empty"), None);
        assert_eq!(ctx_i64(&ctx, "port").unwrap(), 8080);
        assert!(ctx_bool(&ctx, "enabled"));
        assert!(!ctx_bool(&ctx, "missing"));
        assert_eq!(ctx_str_list(&ctx, "tags"), vec!["a", "1", "true"]);
    }
}
