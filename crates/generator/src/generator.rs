//! Provider schema generation from CRD OpenAPI schemas

use crate::config::OutputConfig;
use crate::result::SourceResult;
use crate::validation::ValidationMapper;
use anyhow::{Context, Result};
use provider_crd::{CrdSchema, ValidationRules};
use provider_schema::{snake_case, Attribute, AttributeType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Type name of the data source / resource generated for a CRD version.
///
/// `metal3.io`, `BareMetalHost`, `v1alpha1` becomes
/// `k8s_metal3_io_bare_metal_host_v1alpha1`.
pub fn type_name(group: &str, kind: &str, version: &str) -> String {
    let group = group.replace(['.', '-'], "_").to_lowercase();
    format!(
        "k8s_{}_{}_{}",
        group,
        snake_case(kind),
        version.to_lowercase()
    )
}

/// Type name of the manifest data source generated for a CRD version
pub fn manifest_type_name(group: &str, kind: &str, version: &str) -> String {
    format!("{}_manifest", type_name(group, kind, version))
}

/// A CRD version translated into provider attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedKind {
    pub type_name: String,
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    pub namespaced: bool,
    pub description: String,

    /// Whether the CRD lists `spec` as required
    pub spec_required: bool,

    /// Attributes of the `spec` object
    pub spec_attributes: Vec<Attribute>,
}

impl GeneratedKind {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Load a kind previously written by [`SchemaGenerator::generate`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read generated schema {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse generated schema {}", path.display()))
    }
}

pub struct SchemaGenerator {
    output_config: OutputConfig,
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

impl SchemaGenerator {
    pub fn new(output_config: OutputConfig) -> Self {
        Self { output_config }
    }

    /// Translate one CRD version
    pub fn kind_from_crd(&self, schema: &CrdSchema) -> GeneratedKind {
        let spec_attributes = schema
            .spec_schema()
            .map(|spec| self.attributes_from_openapi(spec))
            .unwrap_or_default();

        GeneratedKind {
            type_name: type_name(&schema.group, &schema.kind, &schema.version),
            group: schema.group.clone(),
            version: schema.version.clone(),
            kind: schema.kind.clone(),
            plural: schema.plural.clone(),
            namespaced: schema.is_namespaced(),
            description: schema.description().to_string(),
            spec_required: schema.spec_required(),
            spec_attributes,
        }
    }

    /// Attributes for the properties of an OpenAPI object schema
    pub fn attributes_from_openapi(&self, schema: &Value) -> Vec<Attribute> {
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };

        let rules = ValidationRules::from_schema(schema);
        let mut seen = HashSet::new();
        let mut attributes = Vec::new();

        let sorted: BTreeMap<&String, &Value> = properties.iter().collect();
        for (json_name, property) in sorted {
            let attribute = self.attribute_from_property(json_name, property, rules.is_required(json_name));

            if !seen.insert(attribute.name.clone()) {
                warn!(
                    "Skipping property {:?}: attribute name {:?} is already taken",
                    json_name, attribute.name
                );
                continue;
            }
            attributes.push(attribute);
        }

        attributes
    }

    fn attribute_from_property(&self, json_name: &str, property: &Value, required: bool) -> Attribute {
        let attribute_type = self.attribute_type(property);
        let rules = ValidationRules::from_schema(property);

        let mut attribute = Attribute::new(json_name, attribute_type);
        if required {
            attribute = attribute.required();
        }
        if let Some(description) = &rules.description {
            attribute = attribute.description(description.clone());
        }
        if rules.format.as_deref() == Some("password") {
            attribute = attribute.sensitive();
        }

        for validator in ValidationMapper::validators(&rules, &attribute.attribute_type) {
            attribute = attribute.validator(validator);
        }

        attribute
    }

    /// Attribute type of an OpenAPI property schema
    pub fn attribute_type(&self, property: &Value) -> AttributeType {
        let flag = |key: &str| property.get(key).and_then(Value::as_bool).unwrap_or(false);

        if flag("x-kubernetes-int-or-string") {
            return AttributeType::Dynamic;
        }

        let has_properties = property
            .get("properties")
            .and_then(Value::as_object)
            .is_some_and(|p| !p.is_empty());

        if flag("x-kubernetes-preserve-unknown-fields") && !has_properties {
            return AttributeType::Dynamic;
        }

        match property.get("type").and_then(Value::as_str) {
            Some("string") => AttributeType::String,
            Some("boolean") => AttributeType::Bool,
            Some("integer") => AttributeType::Int64,
            Some("number") => AttributeType::Float64,
            Some("array") => match property.get("items") {
                Some(items) => match self.attribute_type(items) {
                    AttributeType::Object(attributes) => AttributeType::ListOfObjects(attributes),
                    element @ (AttributeType::String
                    | AttributeType::Bool
                    | AttributeType::Int64
                    | AttributeType::Number
                    | AttributeType::Float64) => AttributeType::List(Box::new(element)),
                    _ => AttributeType::List(Box::new(AttributeType::Dynamic)),
                },
                None => AttributeType::List(Box::new(AttributeType::Dynamic)),
            },
            Some("object") if has_properties => {
                AttributeType::Object(self.attributes_from_openapi(property))
            }
            Some("object") => match property.get("additionalProperties") {
                Some(additional @ Value::Object(_)) => match self.attribute_type(additional) {
                    AttributeType::Object(attributes) => AttributeType::MapOfObjects(attributes),
                    element @ (AttributeType::String
                    | AttributeType::Bool
                    | AttributeType::Int64
                    | AttributeType::Number
                    | AttributeType::Float64) => AttributeType::Map(Box::new(element)),
                    _ => AttributeType::Map(Box::new(AttributeType::Dynamic)),
                },
                _ => AttributeType::Dynamic,
            },
            _ => AttributeType::Dynamic,
        }
    }

    /// Write one `<type_name>.json` file per schema plus an `index.json`
    pub async fn generate(&self, schemas: &[CrdSchema], output_path: &Path) -> Result<SourceResult> {
        let started = Instant::now();
        info!("Generating provider schemas for {} CRD schemas", schemas.len());

        std::fs::create_dir_all(output_path)?;

        let mut result = SourceResult::new("crd", output_path.to_path_buf());
        let mut index = Map::new();

        for schema in schemas {
            let kind = self.kind_from_crd(schema);
            let directory = self
                .output_config
                .directory_for(output_path, &schema.api_version);

            match self.write_kind(&kind, &directory) {
                Ok(path) => {
                    debug!("Wrote {} to {}", kind.type_name, path.display());
                    let relative = path
                        .strip_prefix(output_path)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| path.clone());
                    index.insert(
                        kind.type_name.clone(),
                        Value::String(relative.to_string_lossy().into_owned()),
                    );
                    result.kinds_generated.push(kind.type_name);
                    result.files_generated += 1;
                }
                Err(e) => {
                    result
                        .errors
                        .push(format!("Failed to generate {}: {e}", kind.type_name));
                }
            }

            if schema.spec_schema().is_none() {
                result
                    .warnings
                    .push(format!("{} declares no spec schema", schema.name));
            }
        }

        let index_path = output_path.join("index.json");
        match serde_json::to_string_pretty(&Value::Object(index)) {
            Ok(content) => match std::fs::write(&index_path, content) {
                Ok(()) => result.files_generated += 1,
                Err(e) => result
                    .errors
                    .push(format!("Failed to write index file: {e}")),
            },
            Err(e) => result.errors.push(format!("Failed to encode index file: {e}")),
        }

        result.processing_time_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    fn write_kind(&self, kind: &GeneratedKind, directory: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(directory)?;
        let path = directory.join(format!("{}.json", kind.type_name));
        std::fs::write(&path, serde_json::to_string_pretty(kind)?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_crd::CrdParser;
    use provider_schema::{Schema, Validator};
    use serde_json::json;

    const WIDGET_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example-corp.io
spec:
  group: example-corp.io
  names:
    kind: WidgetSet
    plural: widgetsets
  scope: Namespaced
  versions:
    - name: v1beta1
      served: true
      schema:
        openAPIV3Schema:
          type: object
          required: [spec]
          properties:
            spec:
              type: object
              required: [replicas]
              properties:
                replicas:
                  type: integer
                  minimum: 1
                podIPs:
                  type: array
                  items:
                    type: string
                mode:
                  type: string
                  enum: [fast, slow]
                ports:
                  type: array
                  items:
                    type: object
                    properties:
                      containerPort:
                        type: integer
                labels:
                  type: object
                  additionalProperties:
                    type: string
                size:
                  x-kubernetes-int-or-string: true
                extra:
                  type: object
                  x-kubernetes-preserve-unknown-fields: true
"#;

    fn widget() -> CrdSchema {
        CrdParser::new()
            .parse_str(WIDGET_CRD, Path::new("widget.yaml"))
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_type_names() {
        assert_eq!(
            type_name("metal3.io", "BareMetalHost", "v1alpha1"),
            "k8s_metal3_io_bare_metal_host_v1alpha1"
        );
        assert_eq!(
            type_name("druid.stackable.tech", "DruidCluster", "v1alpha1"),
            "k8s_druid_stackable_tech_druid_cluster_v1alpha1"
        );
        assert_eq!(
            manifest_type_name("example-corp.io", "WidgetSet", "v1beta1"),
            "k8s_example_corp_io_widget_set_v1beta1_manifest"
        );
    }

    #[test]
    fn test_kind_from_crd() {
        let kind = SchemaGenerator::default().kind_from_crd(&widget());

        assert_eq!(kind.type_name, "k8s_example_corp_io_widget_set_v1beta1");
        assert_eq!(kind.api_version(), "example-corp.io/v1beta1");
        assert!(kind.spec_required);
        assert!(kind.namespaced);

        let by_name = |name: &str| {
            kind.spec_attributes
                .iter()
                .find(|a| a.name == name)
                .unwrap_or_else(|| panic!("missing {name}"))
        };

        let replicas = by_name("replicas");
        assert!(replicas.required);
        assert_eq!(replicas.validators, vec![Validator::Int64AtLeast(1)]);

        assert_eq!(
            by_name("pod_ips").attribute_type,
            AttributeType::List(Box::new(AttributeType::String))
        );
        assert_eq!(by_name("pod_ips").json_name, "podIPs");
        assert_eq!(by_name("mode").validators, vec![Validator::one_of(["fast", "slow"])]);
        assert!(matches!(by_name("ports").attribute_type, AttributeType::ListOfObjects(_)));
        assert_eq!(
            by_name("labels").attribute_type,
            AttributeType::Map(Box::new(AttributeType::String))
        );
        assert_eq!(by_name("size").attribute_type, AttributeType::Dynamic);
        assert_eq!(by_name("extra").attribute_type, AttributeType::Dynamic);
    }

    #[test]
    fn test_generated_attributes_pass_implementation_checks() {
        let kind = SchemaGenerator::default().kind_from_crd(&widget());
        let schema = Schema::new("widget").with_attribute(
            Attribute::object("spec", kind.spec_attributes).required(),
        );

        assert!(schema.validate_implementation().is_empty());
    }

    #[test]
    fn test_untyped_property_is_dynamic() {
        let generator = SchemaGenerator::default();
        assert_eq!(generator.attribute_type(&json!({})), AttributeType::Dynamic);
        assert_eq!(
            generator.attribute_type(&json!({"type": "object"})),
            AttributeType::Dynamic
        );
    }

    #[tokio::test]
    async fn test_generate_writes_kinds_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let generator = SchemaGenerator::default();

        let result = generator.generate(&[widget()], dir.path()).await.unwrap();

        assert!(result.errors.is_empty());
        assert_eq!(result.files_generated, 2);

        let path = dir
            .path()
            .join("example-corp.io_v1beta1")
            .join("k8s_example_corp_io_widget_set_v1beta1.json");
        let loaded = GeneratedKind::load(&path).unwrap();
        assert_eq!(loaded.kind, "WidgetSet");

        let index: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("index.json")).unwrap())
                .unwrap();
        assert!(index["k8s_example_corp_io_widget_set_v1beta1"].is_string());
    }
}
