//! Attribute definitions and builders

use crate::naming::snake_case;
use crate::validator::Validator;
use serde::{Deserialize, Serialize};

/// Value type of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "element", rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int64,
    Float64,
    Number,

    /// Arbitrary JSON, passed through untouched in both directions
    Dynamic,

    /// List of scalar (or dynamic) values
    List(Box<AttributeType>),

    /// String-keyed map of scalar (or dynamic) values
    Map(Box<AttributeType>),

    /// Single nested object
    Object(Vec<Attribute>),

    /// List of nested objects
    ListOfObjects(Vec<Attribute>),

    /// String-keyed map of nested objects
    MapOfObjects(Vec<Attribute>),
}

impl AttributeType {
    /// Human readable type label used in diagnostics
    pub fn label(&self) -> String {
        match self {
            AttributeType::String => "string".to_string(),
            AttributeType::Bool => "bool".to_string(),
            AttributeType::Int64 => "number (int64)".to_string(),
            AttributeType::Float64 | AttributeType::Number => "number".to_string(),
            AttributeType::Dynamic => "any value".to_string(),
            AttributeType::List(element) => format!("list of {}", element.label()),
            AttributeType::Map(element) => format!("map of {}", element.label()),
            AttributeType::Object(_) => "object".to_string(),
            AttributeType::ListOfObjects(_) => "list of object".to_string(),
            AttributeType::MapOfObjects(_) => "map of object".to_string(),
        }
    }

    /// Nested attributes, if this type has any
    pub fn nested(&self) -> Option<&[Attribute]> {
        match self {
            AttributeType::Object(attributes)
            | AttributeType::ListOfObjects(attributes)
            | AttributeType::MapOfObjects(attributes) => Some(attributes),
            _ => None,
        }
    }

    fn nested_mut(&mut self) -> Option<&mut Vec<Attribute>> {
        match self {
            AttributeType::Object(attributes)
            | AttributeType::ListOfObjects(attributes)
            | AttributeType::MapOfObjects(attributes) => Some(attributes),
            _ => None,
        }
    }
}

/// A single attribute of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name (snake_case)
    pub name: String,

    /// Kubernetes JSON field name (camelCase)
    pub json_name: String,

    /// Value type
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub computed: bool,

    #[serde(default)]
    pub sensitive: bool,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub markdown_description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    /// Create an optional attribute for the given Kubernetes field
    pub fn new(json_name: impl Into<String>, attribute_type: AttributeType) -> Self {
        let json_name = json_name.into();
        Self {
            name: snake_case(&json_name),
            json_name,
            attribute_type,
            required: false,
            optional: true,
            computed: false,
            sensitive: false,
            description: String::new(),
            markdown_description: String::new(),
            validators: Vec::new(),
        }
    }

    pub fn string(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::String)
    }

    pub fn bool(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::Bool)
    }

    pub fn int64(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::Int64)
    }

    pub fn float64(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::Float64)
    }

    pub fn dynamic(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::Dynamic)
    }

    pub fn string_list(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::List(Box::new(AttributeType::String)))
    }

    pub fn string_map(json_name: impl Into<String>) -> Self {
        Self::new(json_name, AttributeType::Map(Box::new(AttributeType::String)))
    }

    pub fn object(json_name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self::new(json_name, AttributeType::Object(attributes))
    }

    pub fn list_of_objects(json_name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self::new(json_name, AttributeType::ListOfObjects(attributes))
    }

    pub fn map_of_objects(json_name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self::new(json_name, AttributeType::MapOfObjects(attributes))
    }

    /// Mark the attribute as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self.computed = false;
        self
    }

    /// Mark the attribute as computed only
    pub fn computed(mut self) -> Self {
        self.required = false;
        self.optional = false;
        self.computed = true;
        self
    }

    /// Mark the attribute as optional and computed
    pub fn optional_computed(mut self) -> Self {
        self.required = false;
        self.optional = true;
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Set both the plain and the markdown description
    pub fn description(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.markdown_description = text.clone();
        self.description = text;
        self
    }

    /// Override the derived attribute name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Whether users can set this attribute in configuration
    pub fn is_configurable(&self) -> bool {
        self.required || self.optional
    }

    /// Turn the attribute tree into a read-only one: every attribute becomes
    /// computed and validators are dropped.
    pub fn into_computed(mut self) -> Self {
        self.required = false;
        self.optional = false;
        self.computed = true;
        self.validators.clear();
        if let Some(nested) = self.attribute_type.nested_mut() {
            let attributes = std::mem::take(nested);
            *nested = attributes.into_iter().map(Attribute::into_computed).collect();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_derived_from_json_name() {
        let attribute = Attribute::string("bootMACAddress");
        assert_eq!(attribute.name, "boot_mac_address");
        assert_eq!(attribute.json_name, "bootMACAddress");
        assert!(attribute.optional);
        assert!(!attribute.required);
    }

    #[test]
    fn test_required_clears_optional() {
        let attribute = Attribute::string("address").required();
        assert!(attribute.required);
        assert!(!attribute.optional);
        assert!(!attribute.computed);
    }

    #[test]
    fn test_description_sets_both_fields() {
        let attribute = Attribute::bool("online").description("Whether the host is powered on");
        assert_eq!(attribute.description, attribute.markdown_description);
    }

    #[test]
    fn test_into_computed_is_recursive() {
        let attribute = Attribute::object(
            "bmc",
            vec![
                Attribute::string("address")
                    .required()
                    .validator(Validator::StringLengthAtLeast(1)),
                Attribute::bool("disableCertificateVerification"),
            ],
        )
        .required()
        .into_computed();

        assert!(attribute.computed && !attribute.required && !attribute.optional);
        let nested = attribute.attribute_type.nested().unwrap();
        assert!(nested.iter().all(|a| a.computed && !a.is_configurable()));
        assert!(nested.iter().all(|a| a.validators.is_empty()));
    }
}
