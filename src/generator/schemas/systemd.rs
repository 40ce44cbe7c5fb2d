//! systemd service unit schema and template

use serde_json::{Map, Value};

use crate::generator::metadata::{
    DefaultValue, FieldKind, FieldSpec, FieldType, Presence, ServiceSchema,
};
use crate::services::render::{ctx_dict, ctx_opt_i64, ctx_opt_str, ctx_str, value_to_string, TemplateError};

pub static SCHEMA: ServiceSchema = ServiceSchema {
    service: "systemd",
    display_name: "Systemd",
    description: "Service unit file for the systemd init system",
    file_extension: ".service",
    template: "systemd.service",
    fields: &[
        FieldSpec {
            name: "description",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "Short service description shown by systemctl status",
            example: Some("My custom systemd service"),
        },
        FieldSpec {
            name: "after",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "Unit or target this service must start after",
            example: Some("network.target"),
        },
        FieldSpec {
            name: "exec_start",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "Command executed when the service starts",
            example: Some("/usr/bin/python3 /opt/app.py"),
        },
        FieldSpec {
            name: "restart_policy",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Restart policy, e.g. 'always', 'on-failure' or 'no'",
            example: Some("always"),
        },
        FieldSpec {
            name: "user",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "User the service runs as",
            example: Some("appuser"),
        },
        FieldSpec {
            name: "group",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Group the service runs as",
            example: Some("appgroup"),
        },
        FieldSpec {
            name: "working_directory",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Working directory the service is started in",
            example: Some("/opt/app"),
        },
        FieldSpec {
            name: "environment",
            ty: FieldType::Primitive(FieldKind::Dict),
            presence: Presence::Optional(DefaultValue::None),
            description: "Environment variables set before the service starts",
            example: None,
        },
        FieldSpec {
            name: "timeout_start_sec",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::None),
            description: "How long systemd waits for a successful start before giving up",
            example: Some("30"),
        },
        FieldSpec {
            name: "timeout_stop_sec",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::None),
            description: "How long systemd waits for a clean shutdown before killing the service",
            example: Some("30"),
        },
        FieldSpec {
            name: "restart_sec",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::None),
            description: "Delay before the service is restarted after exiting",
            example: Some("5"),
        },
        FieldSpec {
            name: "log_level",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Log level cap for this service, e.g. 'info', 'debug' or 'warning'",
            example: Some("info"),
        },
        FieldSpec {
            name: "wanted_by",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("multi-user.target")),
            description: "Target the service is attached to, usually multi-user.target",
            example: Some("multi-user.target"),
        },
    ],
    primary: &["description", "after", "exec_start"],
    dependencies: &[("restart_policy", &["restart_sec"])],
};

pub(crate) fn render(ctx: &Map<String, Value>) -> Result<String, TemplateError> {
    let description = ctx_str(ctx, "description")?;
    let after = ctx_str(ctx, "after")?;
    let exec_start = ctx_str(ctx, "exec_start")?;

    let mut out = String::new();

    out.push_str("[Unit]\n");
    out.push_str(&format!("Description={description}\n"));
    out.push_str(&format!("After={after}\n"));

    out.push_str("\n[Service]\n");
    out.push_str(&format!("ExecStart={exec_start}\n"));
    if let Some(policy) = ctx_opt_str(ctx, "restart_policy") {
        out.push_str(&format!("Restart={policy}\n"));
    }
    if let Some(user) = ctx_opt_str(ctx, "user") {
        out.push_str(&format!("User={user}\n"));
    }
    if let Some(group) = ctx_opt_str(ctx, "group") {
        out.push_str(&format!("Group={group}\n"));
    }
    if let Some(directory) = ctx_opt_str(ctx, "working_directory") {
        out.push_str(&format!("WorkingDirectory={directory}\n"));
    }
    if let Some(environment) = ctx_dict(ctx, "environment") {
        for (key, value) in environment {
            out.push_str(&format!("Environment=\"{}={}\"\n", key, value_to_string(value)));
        }
    }
    if let Some(timeout) = ctx_opt_i64(ctx, "timeout_start_sec") {
        out.push_str(&format!("TimeoutStartSec={timeout}\n"));
    }
    if let Some(timeout) = ctx_opt_i64(ctx, "timeout_stop_sec") {
        out.push_str(&format!("TimeoutStopSec={timeout}\n"));
    }
    if let Some(delay) = ctx_opt_i64(ctx, "restart_sec") {
        out.push_str(&format!("RestartSec={delay}\n"));
    }
    if let Some(level) = ctx_opt_str(ctx, "log_level") {
        out.push_str(&format!("LogLevelMax={level}\n"));
    }

    out.push_str("\n[Install]\n");
    let wanted_by = ctx_opt_str(ctx, "wanted_by").unwrap_or("multi-user.target");
    out.push_str(&format!("WantedBy={wanted_by}\n"));

    Ok(out)
}
