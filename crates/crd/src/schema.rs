//! CRD schema definition and implementation

use crate::types::{Scope, ValidationRules};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// One served version of a parsed CRD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrdSchema {
    /// CRD name (`<plural>.<group>`)
    pub name: String,

    /// API group
    pub group: String,

    /// API version
    pub version: String,

    /// Full API version (group/version)
    pub api_version: String,

    /// Resource kind (from spec.names.kind)
    pub kind: String,

    /// Plural resource name (from spec.names.plural)
    pub plural: String,

    /// Resource scope
    pub scope: Scope,

    /// OpenAPI v3 schema of the whole object
    pub schema: Value,

    /// Source file path
    pub source_path: PathBuf,

    /// Validation rules of the top-level schema
    pub validation_rules: ValidationRules,
}

impl CrdSchema {
    /// Get the kind name (from spec.names.kind)
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Get the plural resource name
    pub fn resource_name(&self) -> &str {
        &self.plural
    }

    pub fn is_namespaced(&self) -> bool {
        self.scope.is_namespaced()
    }

    /// Get the schema properties
    pub fn properties(&self) -> Option<&serde_json::Map<String, Value>> {
        self.schema.get("properties")?.as_object()
    }

    /// The `spec` property schema, if the CRD declares one
    pub fn spec_schema(&self) -> Option<&Value> {
        self.properties()?.get("spec")
    }

    /// The `status` property schema, if the CRD declares one
    pub fn status_schema(&self) -> Option<&Value> {
        self.properties()?.get("status")
    }

    /// Whether `spec` is listed as required at the top level
    pub fn spec_required(&self) -> bool {
        self.validation_rules.is_required("spec")
    }

    /// Description of the top-level schema
    pub fn description(&self) -> &str {
        self.validation_rules.description.as_deref().unwrap_or("")
    }
}
