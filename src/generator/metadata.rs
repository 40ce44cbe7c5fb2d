//! Declarative schema descriptors and form-metadata derivation
//!
//! Each supported service declares a static table of `FieldSpec`s plus a
//! dependency map and a primary-field allowlist. The derivation below turns
//! any such table into the descriptor the form UI renders, so adding a
//! service never means writing new metadata code. Requiredness is modeled
//! explicitly (`Presence::Required` vs `Presence::Optional` with a default),
//! not inferred from wrapper types.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::common::validation::ValidationResult;

/// Primitive shape of a field, as exposed to the form UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Str,
    List,
    Dict,
}

impl FieldKind {
    /// Type tag reported to the UI
    pub fn type_tag(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Str => "str",
            FieldKind::List => "list",
            FieldKind::Dict => "dict",
        }
    }

    /// Widget used to edit a field of this kind
    pub fn widget(&self) -> &'static str {
        match self {
            FieldKind::Bool => "checkbox",
            FieldKind::Int => "number",
            FieldKind::List => "array",
            FieldKind::Dict => "json",
            FieldKind::Str => "text",
        }
    }
}

/// Declared type of a field: a primitive, or a composite carrying its own
/// field table (a single sub-object or a list of them). Composites are
/// flattened into dotted field names during derivation.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    Primitive(FieldKind),
    Nested(&'static [FieldSpec]),
}

/// Statically declarable default values
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    None,
    Bool(bool),
    Int(i64),
    Str(&'static str),
    StrList(&'static [&'static str]),
    /// Verbatim JSON for dict- and tuple-shaped defaults
    Json(&'static str),
}

impl DefaultValue {
    pub fn to_value(&self) -> Option<Value> {
        match self {
            DefaultValue::None => None,
            DefaultValue::Bool(v) => Some(Value::Bool(*v)),
            DefaultValue::Int(v) => Some(Value::from(*v)),
            DefaultValue::Str(v) => Some(Value::from(*v)),
            DefaultValue::StrList(items) => Some(Value::from(
                items.iter().map(|s| Value::from(*s)).collect::<Vec<_>>(),
            )),
            DefaultValue::Json(raw) => serde_json::from_str(raw).ok(),
        }
    }
}

/// Whether a field must be supplied, or may fall back to a default
#[derive(Debug, Clone, Copy)]
pub enum Presence {
    Required,
    Optional(DefaultValue),
}

/// One declared schema field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub presence: Presence,
    pub description: &'static str,
    pub example: Option<&'static str>,
}

/// A supported service: its field table plus everything the generic pipeline
/// needs to expose and render it
pub struct ServiceSchema {
    pub service: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub file_extension: &'static str,
    pub template: &'static str,
    pub fields: &'static [FieldSpec],
    pub primary: &'static [&'static str],
    pub dependencies: &'static [(&'static str, &'static [&'static str])],
}

/// One entry of the derived form descriptor
#[derive(Debug, Serialize, PartialEq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub required: bool,
    #[serde(rename = "defaultValue")]
    pub default_value: Option<Value>,
    pub description: String,
    #[serde(rename = "variableType")]
    pub variable_type: &'static str,
    #[serde(rename = "type")]
    pub widget: &'static str,
    #[serde(rename = "isAdvanced")]
    pub is_advanced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Derived form descriptor returned by the metadata endpoint
#[derive(Debug, Serialize, PartialEq)]
pub struct FormMetadata {
    pub fields: Vec<FormField>,
    pub dependencies: BTreeMap<String, Vec<String>>,
}

/// Derive the form descriptor for a service schema
///
/// Fields come out in declaration order; composite fields are replaced in
/// place by their dotted sub-fields, whose requiredness is judged against
/// the sub-schema's own required set. Dependency entries are copied through
/// only when the key names a declared field (composite parents included).
pub fn derive_form_metadata(schema: &ServiceSchema) -> FormMetadata {
    let mut fields = Vec::new();
    collect_fields(schema.fields, "", schema.primary, &mut fields);

    let mut declared: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
    collect_composite_names(schema.fields, "", &mut declared);

    let dependencies = schema
        .dependencies
        .iter()
        .filter(|(key, _)| declared.iter().any(|name| name == key))
        .map(|(key, dependents)| {
            (
                (*key).to_string(),
                dependents.iter().map(|d| (*d).to_string()).collect(),
            )
        })
        .collect();

    FormMetadata {
        fields,
        dependencies,
    }
}

fn collect_fields(specs: &[FieldSpec], prefix: &str, primary: &[&str], out: &mut Vec<FormField>) {
    for spec in specs {
        let full_name = qualify(prefix, spec.name);
        match spec.ty {
            FieldType::Nested(sub) => collect_fields(sub, &full_name, primary, out),
            FieldType::Primitive(kind) => {
                let required = matches!(spec.presence, Presence::Required);
                let default_value = match spec.presence {
                    Presence::Required => None,
                    Presence::Optional(default) => default.to_value(),
                };
                out.push(FormField {
                    name: full_name.clone(),
                    label: humanize(spec.name),
                    required,
                    default_value,
                    description: spec.description.to_string(),
                    variable_type: kind.type_tag(),
                    widget: kind.widget(),
                    is_advanced: !required && !primary.contains(&full_name.as_str()),
                    placeholder: spec.example.map(str::to_string),
                });
            }
        }
    }
}

fn collect_composite_names(specs: &[FieldSpec], prefix: &str, out: &mut Vec<String>) {
    for spec in specs {
        if let FieldType::Nested(sub) = spec.ty {
            let full_name = qualify(prefix, spec.name);
            out.push(full_name.clone());
            collect_composite_names(sub, &full_name, out);
        }
    }
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// "server_name" -> "Server name"
fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ").to_lowercase();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Generic required-field presence check run before rendering
///
/// Required strings must be non-blank and required mappings non-empty;
/// anything else just has to be present and non-null.
pub fn validate_required(schema: &ServiceSchema, fields: &Map<String, Value>) -> ValidationResult {
    let mut result = ValidationResult::new();
    for spec in schema.fields {
        if !matches!(spec.presence, Presence::Required) {
            continue;
        }
        match fields.get(spec.name) {
            None | Some(Value::Null) => result.add_error(spec.name, "field is required"),
            Some(Value::String(s)) if s.trim().is_empty() => {
                result.add_error(spec.name, "field must not be empty");
            }
            Some(Value::Object(map)) if map.is_empty() => {
                result.add_error(spec.name, "field must not be empty");
            }
            Some(_) => {}
        }
    }
    result
}

/// Fill descriptor defaults for optional top-level fields the caller omitted
/// (or sent as null), so render functions can rely on them being present
pub fn apply_defaults(schema: &ServiceSchema, fields: &mut Map<String, Value>) {
    for spec in schema.fields {
        if let Presence::Optional(default) = spec.presence {
            let missing = matches!(fields.get(spec.name), None | Some(Value::Null));
            if missing {
                if let Some(value) = default.to_value() {
                    fields.insert(spec.name.to_string(), value);
                }
            }
        }
    }
}
