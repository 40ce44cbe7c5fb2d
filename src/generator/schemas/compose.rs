//! docker-compose schema and template

use serde_json::{Map, Value};

use crate::generator::metadata::{
    DefaultValue, FieldKind, FieldSpec, FieldType, Presence, ServiceSchema,
};
use crate::services::render::{ctx_dict, ctx_str, value_to_string, TemplateError};

/// Sub-schema shared by every entry under `services`
static SERVICE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "image",
        ty: FieldType::Primitive(FieldKind::Str),
        presence: Presence::Required,
        description: "Docker image the container runs",
        example: Some("nginx:latest"),
    },
    FieldSpec {
        name: "container_name",
        ty: FieldType::Primitive(FieldKind::Str),
        presence: Presence::Optional(DefaultValue::None),
        description: "Explicit container name",
        example: Some("my_nginx"),
    },
    FieldSpec {
        name: "ports",
        ty: FieldType::Primitive(FieldKind::List),
        presence: Presence::Optional(DefaultValue::None),
        description: "Published ports in host:container format",
        example: None,
    },
    FieldSpec {
        name: "volumes",
        ty: FieldType::Primitive(FieldKind::List),
        presence: Presence::Optional(DefaultValue::None),
        description: "Volumes mounted into the container",
        example: None,
    },
    FieldSpec {
        name: "networks",
        ty: FieldType::Primitive(FieldKind::List),
        presence: Presence::Optional(DefaultValue::None),
        description: "Networks the container joins",
        example: None,
    },
    FieldSpec {
        name: "build",
        ty: FieldType::Primitive(FieldKind::Dict),
        presence: Presence::Optional(DefaultValue::None),
        description: "Image build settings (context, dockerfile)",
        example: None,
    },
    FieldSpec {
        name: "command",
        ty: FieldType::Primitive(FieldKind::List),
        presence: Presence::Optional(DefaultValue::None),
        description: "Command executed when the container starts",
        example: None,
    },
];

pub static SCHEMA: ServiceSchema = ServiceSchema {
    service: "docker-compose",
    display_name: "Docker Compose",
    description: "Multi-container application definition for docker-compose",
    file_extension: ".yml",
    template: "docker-compose.yml",
    fields: &[
        FieldSpec {
            name: "version",
            ty: FieldType::Primitive(FieldKind::Str),
            presence: Presence::Required,
            description: "docker-compose file format version",
            example: Some("3.9"),
        },
        FieldSpec {
            name: "services",
            ty: FieldType::Nested(SERVICE_FIELDS),
            presence: Presence::Required,
            description: "Containers that make up the application, keyed by name",
            example: None,
        },
        FieldSpec {
            name: "networks",
            ty: FieldType::Primitive(FieldKind::Dict),
            presence: Presence::Optional(DefaultValue::None),
            description: "Networks shared by the containers",
            example: None,
        },
        FieldSpec {
            name: "volumes",
            ty: FieldType::Primitive(FieldKind::Dict),
            presence: Presence::Optional(DefaultValue::None),
            description: "Named volumes shared by the containers",
            example: None,
        },
    ],
    primary: &["version", "services.image"],
    dependencies: &[
        ("enable_networks", &["networks"]),
        ("enable_volumes", &["volumes"]),
        ("enable_build", &["build"]),
        ("enable_ports", &["ports"]),
        ("enable_depends_on", &["depends_on"]),
    ],
};

fn push_yaml_list(out: &mut String, indent: &str, key: &str, items: &[Value]) {
    out.push_str(&format!("{indent}{key}:\n"));
    for item in items {
        out.push_str(&format!("{indent}  - {}\n", value_to_string(item)));
    }
}

pub(crate) fn render(ctx: &Map<String, Value>) -> Result<String, TemplateError> {
    let version = ctx_str(ctx, "version")?;
    let services = ctx_dict(ctx, "services")
        .ok_or_else(|| TemplateError::Render("missing mapping field `services`".to_string()))?;

    let mut out = String::new();

    out.push_str(&format!("version: '{version}'\n\n"));
    out.push_str("services:\n");

    for (name, service) in services {
        let Some(service) = service.as_object() else {
            return Err(TemplateError::Render(format!(
                "service `{}` must be an object",
                name
            )));
        };

        out.push_str(&format!("  {name}:\n"));

        if let Some(build) = service.get("build").and_then(Value::as_object) {
            out.push_str("    build:\n");
            for (key, value) in build {
                out.push_str(&format!("      {}: {}\n", key, value_to_string(value)));
            }
        }

        let image = service.get("image").and_then(Value::as_str).ok_or_else(|| {
            TemplateError::Render(format!("service `{}` is missing `image`", name))
        })?;
        out.push_str(&format!("    image: {image}\n"));

        if let Some(container_name) = service.get("container_name").and_then(Value::as_str) {
            out.push_str(&format!("    container_name: {container_name}\n"));
        }
        if let Some(ports) = service.get("ports").and_then(Value::as_array) {
            push_yaml_list(&mut out, "    ", "ports", ports);
        }
        if let Some(volumes) = service.get("volumes").and_then(Value::as_array) {
            push_yaml_list(&mut out, "    ", "volumes", volumes);
        }
        if let Some(networks) = service.get("networks").and_then(Value::as_array) {
            push_yaml_list(&mut out, "    ", "networks", networks);
        }
        if let Some(command) = service.get("command").and_then(Value::as_array) {
            let parts: Vec<String> = command.iter().map(value_to_string).collect();
            out.push_str(&format!("    command: [{}]\n", parts.join(", ")));
        }
    }

    if let Some(networks) = ctx_dict(ctx, "networks") {
        if !networks.is_empty() {
            out.push_str("\nnetworks:\n");
            for (name, _) in networks {
                out.push_str(&format!("  {name}:\n"));
            }
        }
    }

    if let Some(volumes) = ctx_dict(ctx, "volumes") {
        if !volumes.is_empty() {
            out.push_str("\nvolumes:\n");
            for (name, _) in volumes {
                out.push_str(&format!("  {name}:\n"));
            }
        }
    }

    Ok(out)
}
