//! Redis server schema and template

use serde_json::{Map, Value};

use crate::generator::metadata::{
    DefaultValue, FieldKind, FieldSpec, FieldType, Presence, ServiceSchema,
};
use crate::services::render::{
    ctx_array, ctx_bool, ctx_dict, ctx_i64, ctx_opt_i64, ctx_opt_str, ctx_str, value_to_string,
    TemplateError,
};

pub static SCHEMA: ServiceSchema = ServiceSchema {
    service: "redis",
    display_name: "Redis",
    description: "Server configuration for the Redis key-value store",
    file_extension: ".conf",
    template: "redis.conf",
    fields: &[
        FieldSpec {
            name: "include_comments",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Include explanatory comments in the generated file",
            example: None,
        },
        FieldSpec {
            name: "bind",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "IP address Redis accepts connections on",
            example: Some("127.0.0.1"),
        },
        FieldSpec {
            name: "port",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Required,
            description: "Redis port",
            example: Some("6379"),
        },
        FieldSpec {
            name: "timeout",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(0)),
            description: "Connection timeout in seconds (0 disables the timeout)",
            example: Some("0"),
        },
        FieldSpec {
            name: "enable_logging",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Enable logging",
            example: None,
        },
        FieldSpec {
            name: "loglevel",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("notice")),
            description: "Log verbosity level",
            example: Some("notice"),
        },
        FieldSpec {
            name: "logfile",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("/var/log/redis/redis-server.log")),
            description: "Path of the log file",
            example: Some("/var/log/redis/redis-server.log"),
        },
        FieldSpec {
            name: "maxmemory",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("256mb")),
            description: "Maximum memory Redis may use",
            example: Some("256mb"),
        },
        FieldSpec {
            name: "maxmemory_policy",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("noeviction")),
            description: "Eviction policy applied once maxmemory is reached",
            example: Some("noeviction"),
        },
        FieldSpec {
            name: "enable_persistence",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(true)),
            description: "Persist data to disk with RDB snapshots",
            example: None,
        },
        FieldSpec {
            name: "save_intervals",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::Json("[[900, 1], [300, 10], [60, 10000]]")),
            description: "Snapshot rules as [seconds, changed-keys] pairs",
            example: None,
        },
        FieldSpec {
            name: "enable_replication",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Replicate from a master instance",
            example: None,
        },
        FieldSpec {
            name: "slaveof",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("")),
            description: "Master address and port to replicate from",
            example: Some("192.168.1.100 6379"),
        },
        FieldSpec {
            name: "requirepass",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("")),
            description: "Password required to access Redis",
            example: None,
        },
        FieldSpec {
            name: "custom_settings",
            ty: FieldType::Primitive(FieldKind::Dict),
            presence: Presence::Optional(DefaultValue::Json(r#"{"appendonly": "yes"}"#)),
            description: "Extra configuration directives as key-value pairs",
            example: None,
        },
    ],
    primary: &[
        "bind",
        "port",
        "enable_logging",
        "enable_persistence",
        "enable_replication",
    ],
    dependencies: &[
        ("enable_logging", &["loglevel"]),
        ("enable_ssl", &["ssl_cert_file", "ssl_key_file"]),
        ("enable_replication", &["slaveof"]),
    ],
};

pub(crate) fn render(ctx: &Map<String, Value>) -> Result<String, TemplateError> {
    let bind = ctx_str(ctx, "bind")?;
    let port = ctx_i64(ctx, "port")?;
    let comments = ctx_bool(ctx, "include_comments");

    let mut out = String::new();

    if comments {
        out.push_str("# Network\n");
    }
    out.push_str(&format!("bind {bind}\n"));
    out.push_str(&format!("port {port}\n"));
    if let Some(timeout) = ctx_opt_i64(ctx, "timeout") {
        out.push_str(&format!("timeout {timeout}\n"));
    }

    if ctx_bool(ctx, "enable_logging") {
        if comments {
            out.push_str("\n# Logging\n");
        } else {
            out.push('\n');
        }
        if let Some(level) = ctx_opt_str(ctx, "loglevel") {
            out.push_str(&format!("loglevel {level}\n"));
        }
        if let Some(file) = ctx_opt_str(ctx, "logfile") {
            out.push_str(&format!("logfile {file}\n"));
        }
    }

    if comments {
        out.push_str("\n# Memory\n");
    } else {
        out.push('\n');
    }
    if let Some(memory) = ctx_opt_str(ctx, "maxmemory") {
        out.push_str(&format!("maxmemory {memory}\n"));
    }
    if let Some(policy) = ctx_opt_str(ctx, "maxmemory_policy") {
        out.push_str(&format!("maxmemory-policy {policy}\n"));
    }

    if ctx_bool(ctx, "enable_persistence") {
        if comments {
            out.push_str("\n# Persistence\n");
        } else {
            out.push('\n');
        }
        if let Some(intervals) = ctx_array(ctx, "save_intervals") {
            for pair in intervals {
                if let Some(items) = pair.as_array() {
                    if items.len() == 2 {
                        out.push_str(&format!(
                            "save {} {}\n",
                            value_to_string(&items[0]),
                            value_to_string(&items[1])
                        ));
                    }
                }
            }
        }
    }

    if ctx_bool(ctx, "enable_replication") {
        if let Some(master) = ctx_opt_str(ctx, "slaveof") {
            if comments {
                out.push_str("\n# Replication\n");
            } else {
                out.push('\n');
            }
            out.push_str(&format!("slaveof {master}\n"));
        }
    }

    if let Some(password) = ctx_opt_str(ctx, "requirepass") {
        if comments {
            out.push_str("\n# Security\n");
        } else {
            out.push('\n');
        }
        out.push_str(&format!("requirepass {password}\n"));
    }

    if let Some(custom) = ctx_dict(ctx, "custom_settings") {
        if !custom.is_empty() {
            if comments {
                out.push_str("\n# Custom settings\n");
            } else {
                out.push('\n');
            }
            for (key, value) in custom {
                out.push_str(&format!("{} {}\n", key, value_to_string(value)));
            }
        }
    }

    Ok(out)
}
