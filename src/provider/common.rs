//! Attributes and document plumbing shared by every surface

use crate::crds::{CrdKind, Manifest, ManifestMetadata};
use crate::error::{ProviderError, ProviderResult};
use provider_schema::{Attribute, Diagnostic, Diagnostics, Schema, Validator};
use serde_json::{Map, Value};

/// Root attributes the provider owns and users never set
pub const TYPE_FIELDS: [&str; 2] = ["api_version", "kind"];

/// Which surface an attribute tree is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMode {
    DataSource,
    Manifest,
    Resource,
}

/// `"<name>/<namespace>"`, or just the name for cluster-scoped objects
pub fn format_id(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(namespace) => format!("{name}/{namespace}"),
        None => name.to_string(),
    }
}

pub fn id_attribute() -> Attribute {
    Attribute::string("id")
        .computed()
        .description("The unique ID of this object, formatted as '<name>/<namespace>'.")
}

pub fn type_attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("apiVersion")
            .computed()
            .description("The API group and version of the object."),
        Attribute::string("kind")
            .computed()
            .description("The kind of the object."),
    ]
}

pub fn metadata_attribute(namespaced: bool, mode: SurfaceMode) -> Attribute {
    let mut attributes = vec![Attribute::string("name")
        .required()
        .description("Unique name within a namespace. Cannot be updated.")
        .validator(Validator::StringLengthAtLeast(1))
        .validator(Validator::StringLengthAtMost(253))];

    if namespaced {
        attributes.push(
            Attribute::string("namespace")
                .required()
                .description("The namespace the object lives in. Cannot be updated.")
                .validator(Validator::StringLengthAtLeast(1))
                .validator(Validator::StringLengthAtMost(63)),
        );
    }

    let labels = Attribute::string_map("labels")
        .description("Map of string keys and values that can be used to organize and categorize objects.");
    let annotations = Attribute::string_map("annotations")
        .description("An unstructured key value map stored with an object that may be set by external tools to store and retrieve arbitrary metadata.");

    match mode {
        SurfaceMode::DataSource => {
            attributes.push(labels.computed());
            attributes.push(annotations.computed());
        }
        SurfaceMode::Manifest | SurfaceMode::Resource => {
            attributes.push(labels);
            attributes.push(annotations);
        }
    }

    Attribute::object("metadata", attributes)
        .required()
        .description("Data that helps uniquely identify this object.")
}

pub fn spec_attribute(kind: &dyn CrdKind, mode: SurfaceMode) -> Attribute {
    let spec = Attribute::object("spec", kind.spec_attributes())
        .description(format!("Desired state of the {}.", kind.kind()));

    match mode {
        SurfaceMode::DataSource => spec.into_computed(),
        _ if kind.spec_required() => spec.required(),
        _ => spec,
    }
}

/// Drop `api_version` and `kind` from a configuration document
pub fn strip_type_fields(config: &Value) -> Value {
    match config {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !TYPE_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Validate a configuration document, failing on any error diagnostic
pub fn validate(schema: &Schema, config: &Value) -> ProviderResult<()> {
    let diagnostics = schema.validate_config(config);
    if diagnostics.has_error() {
        Err(ProviderError::InvalidConfiguration(diagnostics))
    } else {
        Ok(())
    }
}

/// Metadata name and namespace of a configuration or state document
pub fn object_identity(kind: &dyn CrdKind, document: &Value) -> ProviderResult<(Option<String>, String)> {
    let metadata = document.get("metadata");
    let field = |name: &str| {
        metadata
            .and_then(|m| m.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let missing = |name: &str| {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(
            Diagnostic::error(
                "Missing required argument",
                format!("The argument \"{name}\" is required, but no definition was found."),
            )
            .with_path(format!("metadata.{name}")),
        );
        ProviderError::InvalidConfiguration(diagnostics)
    };

    let name = field("name").ok_or_else(|| missing("name"))?;
    let namespace = if kind.namespaced() {
        Some(field("namespace").ok_or_else(|| missing("namespace"))?)
    } else {
        None
    };

    Ok((namespace, name))
}

/// Build the Kubernetes object described by a configuration document.
///
/// `api_version`/`kind` in the configuration are ignored; the object always
/// carries the kind's own.
pub fn manifest_from_config(
    kind: &dyn CrdKind,
    schema: &Schema,
    config: &Value,
) -> ProviderResult<Manifest<Value>> {
    let config = strip_type_fields(config);
    validate(schema, &config)?;

    let kubernetes = schema.to_kubernetes(&config);
    let mut metadata: ManifestMetadata =
        serde_json::from_value(kubernetes.get("metadata").cloned().unwrap_or(Value::Null))
            .map_err(|e| ProviderError::Marshal(e.to_string()))?;
    if !kind.namespaced() {
        metadata.namespace = None;
    }

    let spec = match kubernetes.get("spec") {
        Some(spec) if !spec.is_null() => Some(
            kind.canonical_spec(spec.clone())
                .map_err(|e| ProviderError::Marshal(e.to_string()))?,
        ),
        _ => None,
    };

    Ok(Manifest {
        api_version: kind.api_version(),
        kind: kind.kind().to_string(),
        metadata,
        spec,
    })
}

/// State document for an object read back from the cluster
pub fn state_from_object(kind: &dyn CrdKind, schema: &Schema, object: &Value) -> Value {
    let mut state = match schema.from_kubernetes(object) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let metadata = object.get("metadata");
    let name = metadata
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let namespace = if kind.namespaced() {
        metadata
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
    } else {
        None
    };

    state.insert("id".to_string(), Value::String(format_id(namespace, name)));
    force_type_fields(kind, &mut state);
    Value::Object(state)
}

/// Overwrite `api_version` and `kind` where the schema declares them
pub fn force_type_fields(kind: &dyn CrdKind, state: &mut Map<String, Value>) {
    if state.contains_key("api_version") {
        state.insert("api_version".to_string(), Value::String(kind.api_version()));
    }
    if state.contains_key("kind") {
        state.insert("kind".to_string(), Value::String(kind.kind().to_string()));
    }
}
