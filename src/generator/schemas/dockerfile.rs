//! Dockerfile schema and template

use serde_json::{Map, Value};

use crate::generator::metadata::{
    DefaultValue, FieldKind, FieldSpec, FieldType, Presence, ServiceSchema,
};
use crate::services::render::{
    ctx_array, ctx_dict, ctx_opt_str, ctx_str_list, value_to_string, TemplateError,
};

/// Sub-schema for one host-to-container copy instruction
static COPY_FILE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "source",
        ty: FieldType::Primitive(FieldKind::Str),
        presence: Presence::Required,
        description: "Host path of the file or directory to copy into the image",
        example: Some("./local/path/file.txt"),
    },
    FieldSpec {
        name: "destination",
        ty: FieldType::Primitive(FieldKind::Str),
        presence: Presence::Required,
        description: "Path inside the container the file or directory is copied to",
        example: Some("/app/file.txt"),
    },
];

/// Sub-schema for the container health check
static HEALTHCHECK_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "test",
        ty: FieldType::Primitive(FieldKind::List),
        presence: Presence::Required,
        description: "Command run to probe container health",
        example: None,
    },
    FieldSpec {
        name: "interval",
        ty: FieldType::Primitive(FieldKind::Str),
        presence: Presence::Required,
        description: "Time between health probes",
        example: Some("30s"),
    },
    FieldSpec {
        name: "timeout",
        ty: FieldType::Primitive(FieldKind::Str),
        presence: Presence::Required,
        description: "How long a probe may run before it counts as failed",
        example: Some("10s"),
    },
    FieldSpec {
        name: "retries",
        ty: FieldType::Primitive(FieldKind::Int),
        presence: Presence::Required,
        description: "Failed probes tolerated before the container is marked unhealthy",
        example: Some("3"),
    },
];

pub static SCHEMA: ServiceSchema = ServiceSchema {
    service: "dockerfile",
    display_name: "Dockerfile",
    description: "Container image build instructions",
    file_extension: "",
    template: "dockerfile",
    fields: &[
        FieldSpec {
            name: "base_image",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Image the new container image is built on",
            example: Some("python:3.9"),
        },
        FieldSpec {
            name: "maintainer",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Email or name of the image maintainer",
            example: Some("admin@example.com"),
        },
        FieldSpec {
            name: "workdir",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Working directory inside the container",
            example: Some("/app"),
        },
        FieldSpec {
            name: "copy_files",
            ty: FieldType::Nested(COPY_FILE_FIELDS),
            presence: Presence::Optional(DefaultValue::Json("[]")),
            description: "Files or directories copied into the image",
            example: None,
        },
        FieldSpec {
            name: "run_commands",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::Json("[]")),
            description: "Commands executed while building the image",
            example: None,
        },
        FieldSpec {
            name: "expose_ports",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::Json("[]")),
            description: "Ports the container exposes",
            example: None,
        },
        FieldSpec {
            name: "entrypoint",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "Main command the container runs",
            example: Some("python app.py"),
        },
        FieldSpec {
            name: "cmd",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::Json("[]")),
            description: "Default arguments executed when the container starts",
            example: None,
        },
        FieldSpec {
            name: "env_variables",
            ty: FieldType::Primitive(FieldKind::Dict),
            presence: Presence::Optional(DefaultValue::Json("{}")),
            description: "Environment variables set inside the container",
            example: None,
        },
        FieldSpec {
            name: "labels",
            ty: FieldType::Primitive(FieldKind::Dict),
            presence: Presence::Optional(DefaultValue::Json("{}")),
            description: "Image metadata as key-value pairs",
            example: None,
        },
        FieldSpec {
            name: "volumes",
            ty: FieldType::Primitive(FieldKind::List),
            presence: Presence::Optional(DefaultValue::Json("[]")),
            description: "Volumes mounted into the container",
            example: None,
        },
        FieldSpec {
            name: "user",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Optional(DefaultValue::None),
            description: "User the container runs as",
            example: Some("appuser"),
        },
        FieldSpec {
            name: "healthcheck",
            ty: FieldType::Nested(HEALTHCHECK_FIELDS),
            presence: Presence::Optional(DefaultValue::None),
            description: "Container health check settings",
            example: None,
        },
    ],
    primary: &["base_image", "entrypoint"],
    dependencies: &[(
        "healthcheck",
        &[
            "healthcheck.test",
            "healthcheck.interval",
            "healthcheck.timeout",
            "healthcheck.retries",
        ],
    )],
};

pub(crate) fn render(ctx: &Map<String, Value>) -> Result<String, TemplateError> {
    let mut out = String::new();

    if let Some(base_image) = ctx_opt_str(ctx, "base_image") {
        out.push_str(&format!("FROM {base_image}\n"));
    }
    if let Some(maintainer) = ctx_opt_str(ctx, "maintainer") {
        out.push_str(&format!("LABEL maintainer=\"{maintainer}\"\n"));
    }
    if let Some(labels) = ctx_dict(ctx, "labels") {
        for (key, value) in labels {
            out.push_str(&format!("LABEL {}=\"{}\"\n", key, value_to_string(value)));
        }
    }

    if let Some(workdir) = ctx_opt_str(ctx, "workdir") {
        out.push_str(&format!("\nWORKDIR {workdir}\n"));
    }

    if let Some(copies) = ctx_array(ctx, "copy_files") {
        if !copies.is_empty() {
            out.push('\n');
            for entry in copies {
                let Some(copy) = entry.as_object() else {
                    return Err(TemplateError::Render(
                        "copy_files entries must be objects".to_string(),
                    ));
                };
                let source = copy.get("source").and_then(Value::as_str).ok_or_else(|| {
                    TemplateError::Render("copy_files entry is missing `source`".to_string())
                })?;
                let destination =
                    copy.get("destination").and_then(Value::as_str).ok_or_else(|| {
                        TemplateError::Render(
                            "copy_files entry is missing `destination`".to_string(),
                        )
                    })?;
                out.push_str(&format!("COPY {source} {destination}\n"));
            }
        }
    }

    let run_commands = ctx_str_list(ctx, "run_commands");
    if !run_commands.is_empty() {
        out.push('\n');
        for command in run_commands {
            out.push_str(&format!("RUN {command}\n"));
        }
    }

    if let Some(env_variables) = ctx_dict(ctx, "env_variables") {
        if !env_variables.is_empty() {
            out.push('\n');
            for (key, value) in env_variables {
                out.push_str(&format!("ENV {}={}\n", key, value_to_string(value)));
            }
        }
    }

    let expose_ports = ctx_str_list(ctx, "expose_ports");
    if !expose_ports.is_empty() {
        out.push('\n');
        for port in expose_ports {
            out.push_str(&format!("EXPOSE {port}\n"));
        }
    }

    let volumes = ctx_str_list(ctx, "volumes");
    if !volumes.is_empty() {
        out.push('\n');
        for volume in volumes {
            out.push_str(&format!("VOLUME {volume}\n"));
        }
    }

    if let Some(user) = ctx_opt_str(ctx, "user") {
        out.push_str(&format!("\nUSER {user}\n"));
    }

    if let Some(healthcheck) = ctx_dict(ctx, "healthcheck") {
        // The probe command may arrive in Docker's exec form, ["CMD", ...]
        let test = healthcheck
            .get("test")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(value_to_string)
                    .skip_while(|part| part == "CMD")
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        let interval = healthcheck
            .get("interval")
            .and_then(Value::as_str)
            .unwrap_or("30s");
        let timeout = healthcheck
            .get("timeout")
            .and_then(Value::as_str)
            .unwrap_or("10s");
        let retries = healthcheck
            .get("retries")
            .and_then(Value::as_i64)
            .unwrap_or(3);
        out.push_str(&format!(
            "\nHEALTHCHECK --interval={interval} --timeout={timeout} --retries={retries} CMD {test}\n"
        ));
    }

    if let Some(entrypoint) = ctx_opt_str(ctx, "entrypoint") {
        out.push_str(&format!("\nENTRYPOINT {entrypoint}\n"));
    }

    let cmd = ctx_str_list(ctx, "cmd");
    if !cmd.is_empty() {
        let quoted: Vec<String> = cmd.iter().map(|part| format!("\"{}\"", part)).collect();
        out.push_str(&format!("CMD [{}]\n", quoted.join(", ")));
    }

    Ok(out)
}
