//! Custom resource kinds served by the provider
//!
//! Each kind describes its `spec` twice: once as provider attributes, which
//! drive validation and snake_case/camelCase translation, and once as a typed
//! serde model used to canonicalize the translated spec before it is sent to
//! the cluster or rendered.

use crate::client::ObjectKey;
use provider_generator::{manifest_type_name, type_name};
use provider_schema::Attribute;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod metal3;
pub mod openapi;
pub mod stackable;

pub use metal3::BareMetalHostKind;
pub use openapi::OpenApiKind;
pub use stackable::DruidClusterKind;

/// A custom resource kind at one API version
pub trait CrdKind: Send + Sync {
    fn group(&self) -> &str;

    fn version(&self) -> &str;

    fn kind(&self) -> &str;

    /// Plural resource name used in API paths
    fn plural(&self) -> &str;

    fn namespaced(&self) -> bool {
        true
    }

    fn description(&self) -> &str;

    /// Attributes of the `spec` object
    fn spec_attributes(&self) -> Vec<Attribute>;

    fn spec_required(&self) -> bool {
        false
    }

    /// Pass a Kubernetes-shaped spec through the typed model
    fn canonical_spec(&self, spec: Value) -> Result<Value, serde_json::Error>;

    fn api_version(&self) -> String {
        if self.group().is_empty() {
            self.version().to_string()
        } else {
            format!("{}/{}", self.group(), self.version())
        }
    }

    fn type_name(&self) -> String {
        type_name(self.group(), self.kind(), self.version())
    }

    fn manifest_type_name(&self) -> String {
        manifest_type_name(self.group(), self.kind(), self.version())
    }

    fn object_key(&self, namespace: Option<&str>, name: &str) -> ObjectKey {
        ObjectKey {
            group: self.group().to_string(),
            version: self.version().to_string(),
            kind: self.kind().to_string(),
            plural: self.plural().to_string(),
            namespace: if self.namespaced() {
                namespace.map(str::to_string)
            } else {
                None
            },
            name: name.to_string(),
        }
    }
}

/// Round-trip a spec through `S`.
///
/// Fails when `S` drops a field of `spec`, naming every dropped path.
pub fn typed_round_trip<S>(spec: Value) -> Result<Value, serde_json::Error>
where
    S: Serialize + DeserializeOwned,
{
    let typed: S = serde_json::from_value(spec.clone())?;
    let canonical = serde_json::to_value(typed)?;

    let mut dropped = Vec::new();
    dropped_paths(&spec, &canonical, "", &mut dropped);
    if !dropped.is_empty() {
        return Err(serde_json::Error::custom(format!(
            "unknown fields: {}",
            dropped.join(", ")
        )));
    }

    Ok(canonical)
}

/// Paths of non-null values in `input` with no counterpart in `output`
fn dropped_paths(input: &Value, output: &Value, path: &str, dropped: &mut Vec<String>) {
    match (input, output) {
        (Value::Object(input), Value::Object(output)) => {
            for (key, value) in input {
                let child = format!("{path}.{key}");
                match output.get(key) {
                    _ if value.is_null() => {}
                    Some(kept) => dropped_paths(value, kept, &child, dropped),
                    None => dropped.push(child),
                }
            }
        }
        (Value::Array(input), Value::Array(output)) => {
            for (i, (value, kept)) in input.iter().zip(output).enumerate() {
                dropped_paths(value, kept, &format!("{path}[{i}]"), dropped);
            }
        }
        _ => {}
    }
}

/// Object metadata carried by manifests
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// A complete object as rendered or applied
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest<S> {
    pub api_version: String,
    pub kind: String,
    pub metadata: ManifestMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<S>,
}

/// Kinds compiled into the provider, with whether each gets a resource
pub fn builtin_kinds() -> Vec<(Arc<dyn CrdKind>, bool)> {
    vec![
        (Arc::new(DruidClusterKind) as Arc<dyn CrdKind>, false),
        (Arc::new(BareMetalHostKind) as Arc<dyn CrdKind>, true),
    ]
}
