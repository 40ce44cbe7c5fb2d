//! PostgreSQL server schema and template

use serde_json::{Map, Value};

use crate::generator::metadata::{
    DefaultValue, FieldKind, FieldSpec, FieldType, Presence, ServiceSchema,
};
use crate::services::render::{
    ctx_bool, ctx_dict, ctx_i64, ctx_opt_i64, ctx_opt_str, ctx_str, value_to_string, TemplateError,
};

pub static SCHEMA: ServiceSchema = ServiceSchema {
    service: "postgresql",
    display_name: "PostgreSQL",
    description: "Server configuration for the PostgreSQL database",
    file_extension: ".conf",
    template: "postgresql.conf",
    fields: &[
        FieldSpec {
            name: "include_comments",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Include explanatory comments in the generated file",
            example: None,
        },
        FieldSpec {
            name: "listen_addresses",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "Addresses to listen on, e.g. '*', 'localhost' or '0.0.0.0'",
            example: Some("*"),
        },
        FieldSpec {
            name: "port",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Required,
            description: "PostgreSQL port",
            example: Some("5432"),
        },
        FieldSpec {
            name: "enable_logging",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Enable the logging collector",
            example: None,
        },
        FieldSpec {
            name: "log_directory",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("pg_log")),
            description: "Directory log files are written to",
            example: Some("pg_log"),
        },
        FieldSpec {
            name: "log_filename",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("postgresql.log")),
            description: "Log file name",
            example: Some("postgresql.log"),
        },
        FieldSpec {
            name: "log_statement",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("all")),
            description: "Which SQL statements to log (none, ddl, mod, all)",
            example: Some("all"),
        },
        FieldSpec {
            name: "max_connections",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(100)),
            description: "Maximum number of client connections",
            example: Some("100"),
        },
        FieldSpec {
            name: "superuser_reserved_connections",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(3)),
            description: "Connections reserved for the superuser",
            example: Some("3"),
        },
        FieldSpec {
            name: "shared_buffers",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("128MB")),
            description: "Shared memory buffer size",
            example: Some("128MB"),
        },
        FieldSpec {
            name: "work_mem",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("4MB")),
            description: "Working memory per query",
            example: Some("4MB"),
        },
        FieldSpec {
            name: "maintenance_work_mem",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("64MB")),
            description: "Memory for maintenance operations",
            example: Some("64MB"),
        },
        FieldSpec {
            name: "enable_ssl",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Accept SSL connections",
            example: None,
        },
        FieldSpec {
            name: "ssl_cert_file",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("/etc/ssl/certs/ssl-cert.pem")),
            description: "Path to the SSL certificate",
            example: Some("/etc/ssl/certs/ssl-cert.pem"),
        },
        FieldSpec {
            name: "ssl_key_file",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("/etc/ssl/private/ssl-cert.key")),
            description: "Path to the SSL private key",
            example: Some("/etc/ssl/private/ssl-cert.key"),
        },
        FieldSpec {
            name: "enable_replication",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(false)),
            description: "Enable WAL-based replication",
            example: None,
        },
        FieldSpec {
            name: "wal_level",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("replica")),
            description: "WAL verbosity level (minimal, replica, logical)",
            example: Some("replica"),
        },
        FieldSpec {
            name: "max_wal_senders",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(10)),
            description: "Maximum number of WAL sender processes",
            example: Some("10"),
        },
        FieldSpec {
            name: "synchronous_commit",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::Str("on")),
            description: "Synchronous commit mode (on, off, remote_apply)",
            example: Some("on"),
        },
        FieldSpec {
            name: "enable_autovacuum",
            ty: FieldType::Primitive(FieldKind::Bool),
            presence: Presence::Optional(DefaultValue::Bool(true)),
            description: "Run the autovacuum daemon",
            example: None,
        },
        FieldSpec {
            name: "autovacuum_vacuum_threshold",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(50)),
            description: "Row-change threshold that triggers a vacuum",
            example: Some("50"),
        },
        FieldSpec {
            name: "autovacuum_analyze_threshold",
            ty: FieldType::Primitive(FieldKind::Int),
            presence: Presence::Optional(DefaultValue::Int(50)),
            description: "Row-change threshold that triggers an analyze",
            example: Some("50"),
        },
        FieldSpec {
            name: "custom_settings",
            ty: FieldType::Primitive(FieldKind::Dict),
            presence: Presence::Optional(DefaultValue::Json(
                r#"{"shared_preload_libraries": "pg_stat_statements"}"#,
            )),
            description: "Extra settings appended verbatim as key = value lines",
            example: None,
        },
    ],
    primary: &[
        "listen_addresses",
        "port",
        "enable_logging",
        "enable_ssl",
        "enable_replication",
        "enable_autovacuum",
    ],
    dependencies: &[
        ("enable_ssl", &["ssl_cert_file", "ssl_key_file"]),
        (
            "enable_logging",
            &["log_directory", "log_filename", "log_statement"],
        ),
        (
            "enable_replication",
            &["wal_level", "max_wal_senders", "synchronous_commit"],
        ),
        (
            "enable_autovacuum",
            &["autovacuum_vacuum_threshold", "autovacuum_analyze_threshold"],
        ),
    ],
};

pub(crate) fn render(ctx: &Map<String, Value>) -> Result<String, TemplateError> {
    let listen_addresses = ctx_str(ctx, "listen_addresses")?;
    let port = ctx_i64(ctx, "port")?;
    let comments = ctx_bool(ctx, "include_comments");

    let mut out = String::new();

    if comments {
        out.push_str("# Connection settings\n");
    }
    out.push_str(&format!("listen_addresses = '{listen_addresses}'\n"));
    out.push_str(&format!("port = {port}\n"));
    if let Some(connections) = ctx_opt_i64(ctx, "max_connections") {
        out.push_str(&format!("max_connections = {connections}\n"));
    }
    if let Some(reserved) = ctx_opt_i64(ctx, "superuser_reserved_connections") {
        out.push_str(&format!("superuser_reserved_connections = {reserved}\n"));
    }

    if comments {
        out.push_str("\n# Memory settings\n");
    } else {
        out.push('\n');
    }
    if let Some(buffers) = ctx_opt_str(ctx, "shared_buffers") {
        out.push_str(&format!("shared_buffers = {buffers}\n"));
    }
    if let Some(memory) = ctx_opt_str(ctx, "work_mem") {
        out.push_str(&format!("work_mem = {memory}\n"));
    }
    if let Some(memory) = ctx_opt_str(ctx, "maintenance_work_mem") {
        out.push_str(&format!("maintenance_work_mem = {memory}\n"));
    }

    if ctx_bool(ctx, "enable_logging") {
        if comments {
            out.push_str("\n# Logging\n");
        } else {
            out.push('\n');
        }
        out.push_str("logging_collector = on\n");
        if let Some(directory) = ctx_opt_str(ctx, "log_directory") {
            out.push_str(&format!("log_directory = '{directory}'\n"));
        }
        if let Some(filename) = ctx_opt_str(ctx, "log_filename") {
            out.push_str(&format!("log_filename = '{filename}'\n"));
        }
        if let Some(statement) = ctx_opt_str(ctx, "log_statement") {
            out.push_str(&format!("log_statement = '{statement}'\n"));
        }
    }

    if ctx_bool(ctx, "enable_ssl") {
        if comments {
            out.push_str("\n# SSL\n");
        } else {
            out.push('\n');
        }
        out.push_str("ssl = on\n");
        if let Some(certificate) = ctx_opt_str(ctx, "ssl_cert_file") {
            out.push_str(&format!("ssl_cert_file = '{certificate}'\n"));
        }
        if let Some(key) = ctx_opt_str(ctx, "ssl_key_file") {
            out.push_str(&format!("ssl_key_file = '{key}'\n"));
        }
    }

    if ctx_bool(ctx, "enable_replication") {
        if comments {
            out.push_str("\n# Replication\n");
        } else {
            out.push('\n');
        }
        if let Some(level) = ctx_opt_str(ctx, "wal_level") {
            out.push_str(&format!("wal_level = {level}\n"));
        }
        if let Some(senders) = ctx_opt_i64(ctx, "max_wal_senders") {
            out.push_str(&format!("max_wal_senders = {senders}\n"));
        }
        if let Some(mode) = ctx_opt_str(ctx, "synchronous_commit") {
            out.push_str(&format!("synchronous_commit = {mode}\n"));
        }
    }

    if comments {
        out.push_str("\n# Autovacuum\n");
    } else {
        out.push('\n');
    }
    if ctx_bool(ctx, "enable_autovacuum") {
        out.push_str("autovacuum = on\n");
        if let Some(threshold) = ctx_opt_i64(ctx, "autovacuum_vacuum_threshold") {
            out.push_str(&format!("autovacuum_vacuum_threshold = {threshold}\n"));
        }
        if let Some(threshold) = ctx_opt_i64(ctx, "autovacuum_analyze_threshold") {
            out.push_str(&format!("autovacuum_analyze_threshold = {threshold}\n"));
        }
    } else {
        out.push_str("autovacuum = off\n");
    }

    if let Some(custom) = ctx_dict(ctx, "custom_settings") {
        if !custom.is_empty() {
            if comments {
                out.push_str("\n# Custom settings\n");
            } else {
                out.push('\n');
            }
            for (key, value) in custom {
                out.push_str(&format!("{} = '{}'\n", key, value_to_string(value)));
            }
        }
    }

    Ok(out)
}
