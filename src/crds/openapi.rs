//! Kinds described only by a CRD's OpenAPI schema

use crate::crds::CrdKind;
use provider_crd::CrdSchema;
use provider_generator::{GeneratedKind, SchemaGenerator};
use provider_schema::Attribute;
use serde_json::Value;

/// A kind generated at runtime from a CRD file.
///
/// There is no typed model behind it, so the translated spec is sent as is.
#[derive(Debug, Clone)]
pub struct OpenApiKind {
    generated: GeneratedKind,
}

impl OpenApiKind {
    pub fn new(generated: GeneratedKind) -> Self {
        Self { generated }
    }

    pub fn from_crd(generator: &SchemaGenerator, schema: &CrdSchema) -> Self {
        Self::new(generator.kind_from_crd(schema))
    }

    pub fn generated(&self) -> &GeneratedKind {
        &self.generated
    }
}

impl CrdKind for OpenApiKind {
    fn group(&self) -> &str {
        &self.generated.group
    }

    fn version(&self) -> &str {
        &self.generated.version
    }

    fn kind(&self) -> &str {
        &self.generated.kind
    }

    fn plural(&self) -> &str {
        &self.generated.plural
    }

    fn namespaced(&self) -> bool {
        self.generated.namespaced
    }

    fn description(&self) -> &str {
        &self.generated.description
    }

    fn spec_attributes(&self) -> Vec<Attribute> {
        self.generated.spec_attributes.clone()
    }

    fn spec_required(&self) -> bool {
        self.generated.spec_required
    }

    fn canonical_spec(&self, spec: Value) -> Result<Value, serde_json::Error> {
        Ok(spec)
    }

    fn type_name(&self) -> String {
        self.generated.type_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_crd::CrdParser;
    use std::path::Path;

    const WIDGET_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
  names:
    kind: Widget
    plural: widgets
  scope: Cluster
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          properties:
            spec:
              type: object
              properties:
                sizeGiB:
                  type: integer
"#;

    #[test]
    fn test_kind_from_crd() {
        let parser = CrdParser::new();
        let schemas = parser.parse_str(WIDGET_CRD, Path::new("widgets.yaml")).unwrap();
        let kind = OpenApiKind::from_crd(&SchemaGenerator::default(), &schemas[0]);

        assert_eq!(kind.api_version(), "example.com/v1");
        assert_eq!(kind.type_name(), "k8s_example_com_widget_v1");
        assert!(!kind.namespaced());
        assert_eq!(kind.spec_attributes()[0].json_name, "sizeGiB");

        let spec = serde_json::json!({"sizeGiB": 3, "unknown": true});
        assert_eq!(kind.canonical_spec(spec.clone()).unwrap(), spec);
    }
}
