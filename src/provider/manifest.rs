//! YAML rendering without a cluster

use super::common::{
    format_id, id_attribute, manifest_from_config, metadata_attribute,
    spec_attribute, strip_type_fields, type_attributes, SurfaceMode,
};
use crate::crds::{CrdKind, Manifest};
use crate::error::{ProviderError, ProviderResult};
use provider_schema::{Attribute, Schema};
use serde_json::Value;
use std::sync::Arc;

pub struct ManifestDataSource {
    kind: Arc<dyn CrdKind>,
    schema: Schema,
}

impl ManifestDataSource {
    pub fn new(kind: Arc<dyn CrdKind>) -> Self {
        let schema = Schema::new(format!(
            "Renders a {} as a Kubernetes YAML manifest.",
            kind.kind()
        ))
        .with_attribute(id_attribute())
        .with_attributes(type_attributes())
        .with_attribute(metadata_attribute(kind.namespaced(), SurfaceMode::Manifest))
        .with_attribute(spec_attribute(kind.as_ref(), SurfaceMode::Manifest))
        .with_attribute(
            Attribute::string("yaml")
                .computed()
                .description("The generated manifest in YAML format."),
        );

        Self { kind, schema }
    }

    pub fn type_name(&self) -> String {
        self.kind.manifest_type_name()
    }

    pub fn kind(&self) -> &dyn CrdKind {
        self.kind.as_ref()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The object described by `config`
    pub fn manifest(&self, config: &Value) -> ProviderResult<Manifest<Value>> {
        manifest_from_config(self.kind(), &self.schema, config)
    }

    /// Render `config` and return the state with `id` and `yaml` filled in
    pub fn read(&self, config: &Value) -> ProviderResult<Value> {
        let manifest = self.manifest(config)?;
        let yaml = render_yaml(&manifest)?;

        let mut state = match strip_type_fields(config) {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        state.insert(
            "id".to_string(),
            Value::String(format_id(
                manifest.metadata.namespace.as_deref(),
                &manifest.metadata.name,
            )),
        );
        state.insert("yaml".to_string(), Value::String(yaml));
        state.insert("api_version".to_string(), Value::String(manifest.api_version));
        state.insert("kind".to_string(), Value::String(manifest.kind));
        Ok(Value::Object(state))
    }
}

/// Serialize a manifest as a single YAML document
pub fn render_yaml(manifest: &Manifest<Value>) -> ProviderResult<String> {
    serde_yaml::to_string(manifest).map_err(|e| ProviderError::Marshal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::BareMetalHostKind;
    use serde_json::json;

    #[test]
    fn test_render_bare_metal_host() {
        let manifest = ManifestDataSource::new(Arc::new(BareMetalHostKind));
        assert_eq!(
            manifest.type_name(),
            "k8s_metal3_io_bare_metal_host_v1alpha1_manifest"
        );

        let state = manifest
            .read(&json!({
                "metadata": {"name": "node-0", "namespace": "metal3", "labels": {"rack": "4"}},
                "spec": {"online": true, "boot_mac_address": "00:5c:52:31:3a:9c"},
            }))
            .unwrap();

        assert_eq!(state["id"], "node-0/metal3");
        assert_eq!(state["api_version"], "metal3.io/v1alpha1");
        assert_eq!(state["kind"], "BareMetalHost");

        let yaml = state["yaml"].as_str().unwrap();
        assert!(yaml.starts_with("apiVersion: metal3.io/v1alpha1\nkind: BareMetalHost\nmetadata:\n"));
        assert!(yaml.find("metadata:").unwrap() < yaml.find("spec:").unwrap());

        let parsed: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed["metadata"]["labels"]["rack"].as_str(), Some("4"));
        assert_eq!(parsed["spec"]["bootMACAddress"].as_str(), Some("00:5c:52:31:3a:9c"));
        assert_eq!(parsed["spec"]["online"].as_bool(), Some(true));
    }

    #[test]
    fn test_missing_spec_is_omitted() {
        let manifest = ManifestDataSource::new(Arc::new(BareMetalHostKind));
        let state = manifest
            .read(&json!({"metadata": {"name": "node-0", "namespace": "metal3"}}))
            .unwrap();

        let yaml = state["yaml"].as_str().unwrap();
        assert!(!yaml.contains("spec"));
    }
}
