//! CRD types and data structures

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scope of a custom resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Scope {
    #[default]
    Namespaced,
    Cluster,
}

impl Scope {
    pub fn is_namespaced(&self) -> bool {
        matches!(self, Scope::Namespaced)
    }
}

/// Validation rules extracted from an OpenAPI property schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ValidationRules {
    /// Minimum length for strings
    pub min_length: Option<usize>,

    /// Maximum length for strings
    pub max_length: Option<usize>,

    /// Pattern for strings (regex)
    pub pattern: Option<String>,

    /// Minimum value for numbers
    pub minimum: Option<f64>,

    /// Maximum value for numbers
    pub maximum: Option<f64>,

    /// Minimum number of array items
    pub min_items: Option<usize>,

    /// Maximum number of array items
    pub max_items: Option<usize>,

    /// Enum values
    pub enum_values: Vec<String>,

    /// Format (e.g., "date-time", "int-or-string")
    pub format: Option<String>,

    /// Description
    pub description: Option<String>,

    /// Required properties
    pub required: Vec<String>,
}

impl ValidationRules {
    /// Extract validation rules from an OpenAPI schema node
    pub fn from_schema(schema: &Value) -> Self {
        let as_usize = |key: &str| schema.get(key).and_then(Value::as_u64).map(|v| v as usize);
        let strings = |key: &str| -> Vec<String> {
            schema
                .get(key)
                .and_then(Value::as_array)
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            min_length: as_usize("minLength"),
            max_length: as_usize("maxLength"),
            pattern: schema
                .get("pattern")
                .and_then(Value::as_str)
                .map(str::to_string),
            minimum: schema.get("minimum").and_then(Value::as_f64),
            maximum: schema.get("maximum").and_then(Value::as_f64),
            min_items: as_usize("minItems"),
            max_items: as_usize("maxItems"),
            enum_values: strings("enum"),
            format: schema
                .get("format")
                .and_then(Value::as_str)
                .map(str::to_string),
            description: schema
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            required: strings("required"),
        }
    }

    /// Check if a property is listed as required
    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_rules_extraction() {
        let schema = json!({
            "type": "string",
            "minLength": 1,
            "maxLength": 100,
            "pattern": "^[a-zA-Z0-9-]+$",
            "description": "A test field",
            "enum": ["value1", "value2", "value3"],
        });

        let rules = ValidationRules::from_schema(&schema);

        assert_eq!(rules.min_length, Some(1));
        assert_eq!(rules.max_length, Some(100));
        assert_eq!(rules.pattern, Some("^[a-zA-Z0-9-]+$".to_string()));
        assert_eq!(rules.description, Some("A test field".to_string()));
        assert_eq!(rules.enum_values, vec!["value1", "value2", "value3"]);
    }

    #[test]
    fn test_required_properties() {
        let rules = ValidationRules::from_schema(&json!({
            "type": "object",
            "required": ["address", "credentialsName"],
        }));

        assert!(rules.is_required("address"));
        assert!(!rules.is_required("disableCertificateVerification"));
    }

    #[test]
    fn test_non_string_enums_are_skipped() {
        let rules = ValidationRules::from_schema(&json!({"type": "integer", "enum": [1, 2]}));
        assert!(rules.enum_values.is_empty());
    }
}
