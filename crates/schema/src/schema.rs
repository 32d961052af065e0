//! Top-level schema and implementation checks

use crate::attribute::Attribute;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::naming::is_valid_attribute_name;
use crate::value::{object_from_kubernetes, object_to_kubernetes, validate_object};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Root attribute names that collide with meta-arguments of the configuration language
pub const RESERVED_ROOT_NAMES: &[&str] = &[
    "connection",
    "count",
    "depends_on",
    "for_each",
    "lifecycle",
    "provider",
    "provisioner",
];

/// Schema of a data source, manifest or resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema version
    pub version: i64,

    /// Plain text description
    pub description: String,

    /// Markdown description
    pub markdown_description: String,

    /// Root attributes
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            version: 0,
            markdown_description: description.clone(),
            description,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Look up a root attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Translate a configuration document into its Kubernetes form
    pub fn to_kubernetes(&self, config: &Value) -> Value {
        match config {
            Value::Object(map) => Value::Object(object_to_kubernetes(&self.attributes, map)),
            _ => Value::Object(Map::new()),
        }
    }

    /// Translate a Kubernetes document into state form
    pub fn from_kubernetes(&self, object: &Value) -> Value {
        match object {
            Value::Object(map) => Value::Object(object_from_kubernetes(&self.attributes, map)),
            _ => Value::Object(object_from_kubernetes(&self.attributes, &Map::new())),
        }
    }

    /// Validate a user configuration against this schema
    pub fn validate_config(&self, config: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        match config {
            Value::Object(map) => validate_object(&self.attributes, map, "", &mut diagnostics),
            _ => diagnostics.push(Diagnostic::error(
                "Invalid configuration",
                "The configuration must be an object.",
            )),
        }
        diagnostics
    }

    /// Check that the schema itself is well formed
    pub fn validate_implementation(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        for attribute in &self.attributes {
            if RESERVED_ROOT_NAMES.contains(&attribute.name.as_str()) {
                diagnostics.push(
                    Diagnostic::error(
                        "Schema Using Reserved Field Name",
                        format!(
                            "\"{}\" is a reserved root attribute name and cannot be used.",
                            attribute.name
                        ),
                    )
                    .with_path(attribute.name.clone()),
                );
            }
        }

        check_attributes(&self.attributes, "", &mut diagnostics);
        diagnostics
    }
}

fn check_attributes(attributes: &[Attribute], path: &str, diagnostics: &mut Diagnostics) {
    let mut seen = HashSet::new();

    for attribute in attributes {
        let attribute_path = if path.is_empty() {
            attribute.name.clone()
        } else {
            format!("{path}.{}", attribute.name)
        };

        if !is_valid_attribute_name(&attribute.name) {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid Attribute/Block Name",
                    "Names must only contain lowercase alphanumeric characters or underscores and must not start with a number.",
                )
                .with_path(attribute_path.clone()),
            );
        }

        if !seen.insert(attribute.name.as_str()) {
            diagnostics.push(
                Diagnostic::error(
                    "Duplicate Attribute Name",
                    format!("\"{}\" is declared more than once.", attribute.name),
                )
                .with_path(attribute_path.clone()),
            );
        }

        if !attribute.required && !attribute.optional && !attribute.computed {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid Attribute Implementation",
                    "Attribute must set one of Required, Optional, or Computed.",
                )
                .with_path(attribute_path.clone()),
            );
        }

        if attribute.required && (attribute.optional || attribute.computed) {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid Attribute Implementation",
                    "Required attributes cannot also be Optional or Computed.",
                )
                .with_path(attribute_path.clone()),
            );
        }

        for validator in &attribute.validators {
            if !validator.applies_to(&attribute.attribute_type) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Validator",
                        format!(
                            "Validator {validator:?} cannot be used with a {} attribute.",
                            attribute.attribute_type.label()
                        ),
                    )
                    .with_path(attribute_path.clone()),
                );
            }
            if let Err(detail) = validator.check_definition() {
                diagnostics.push(
                    Diagnostic::error("Invalid Attribute Validator", detail)
                        .with_path(attribute_path.clone()),
                );
            }
        }

        if let Some(nested) = attribute.attribute_type.nested() {
            if nested.is_empty() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Implementation",
                        "Nested attributes must declare at least one attribute.",
                    )
                    .with_path(attribute_path.clone()),
                );
            }
            check_attributes(nested, &attribute_path, diagnostics);
        }
    }
}
