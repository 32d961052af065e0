//! Translation and validation of attribute documents
//!
//! Configuration and state documents are keyed by attribute names
//! (snake_case); Kubernetes objects are keyed by JSON field names. Map keys
//! and dynamic values are user data and are never renamed.

use crate::attribute::{Attribute, AttributeType};
use crate::diagnostics::{Diagnostic, Diagnostics};
use serde_json::{Map, Value};

impl AttributeType {
    /// Translate a configuration value of this type into its Kubernetes form
    pub fn to_kubernetes(&self, value: &Value) -> Value {
        match (self, value) {
            (AttributeType::Object(attributes), Value::Object(map)) => {
                Value::Object(object_to_kubernetes(attributes, map))
            }
            (AttributeType::ListOfObjects(attributes), Value::Array(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(map) => Value::Object(object_to_kubernetes(attributes, map)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            (AttributeType::MapOfObjects(attributes), Value::Object(map)) => Value::Object(
                map.iter()
                    .map(|(key, item)| {
                        let converted = match item {
                            Value::Object(inner) => {
                                Value::Object(object_to_kubernetes(attributes, inner))
                            }
                            other => other.clone(),
                        };
                        (key.clone(), converted)
                    })
                    .collect(),
            ),
            (AttributeType::List(element), Value::Array(items)) => {
                Value::Array(items.iter().map(|item| element.to_kubernetes(item)).collect())
            }
            (AttributeType::Map(element), Value::Object(map)) => Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), element.to_kubernetes(item)))
                    .collect(),
            ),
            _ => value.clone(),
        }
    }

    /// Translate a Kubernetes value of this type into its state form
    pub fn from_kubernetes(&self, value: &Value) -> Value {
        match (self, value) {
            (AttributeType::Object(attributes), Value::Object(map)) => {
                Value::Object(object_from_kubernetes(attributes, map))
            }
            (AttributeType::ListOfObjects(attributes), Value::Array(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(map) => {
                            Value::Object(object_from_kubernetes(attributes, map))
                        }
                        other => other.clone(),
                    })
                    .collect(),
            ),
            (AttributeType::MapOfObjects(attributes), Value::Object(map)) => Value::Object(
                map.iter()
                    .map(|(key, item)| {
                        let converted = match item {
                            Value::Object(inner) => {
                                Value::Object(object_from_kubernetes(attributes, inner))
                            }
                            other => other.clone(),
                        };
                        (key.clone(), converted)
                    })
                    .collect(),
            ),
            (AttributeType::List(element), Value::Array(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| element.from_kubernetes(item))
                    .collect(),
            ),
            (AttributeType::Map(element), Value::Object(map)) => Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), element.from_kubernetes(item)))
                    .collect(),
            ),
            _ => value.clone(),
        }
    }

    /// Whether a (non-null) value has the right JSON shape for this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::Int64 => value.is_i64() || value.is_u64(),
            AttributeType::Float64 | AttributeType::Number => value.is_number(),
            AttributeType::Dynamic => true,
            AttributeType::List(_) | AttributeType::ListOfObjects(_) => value.is_array(),
            AttributeType::Map(_) | AttributeType::MapOfObjects(_) | AttributeType::Object(_) => {
                value.is_object()
            }
        }
    }
}

impl Attribute {
    /// Translate a configured value into its Kubernetes form; `None` when the
    /// value is null and the field should be omitted.
    pub fn to_kubernetes(&self, value: &Value) -> Option<Value> {
        if value.is_null() {
            None
        } else {
            Some(self.attribute_type.to_kubernetes(value))
        }
    }
}

/// Rename the keys of a configuration object to Kubernetes field names.
///
/// Nulls and computed-only attributes are left out.
pub fn object_to_kubernetes(attributes: &[Attribute], map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for attribute in attributes.iter().filter(|a| a.is_configurable()) {
        if let Some(converted) = map
            .get(&attribute.name)
            .and_then(|value| attribute.to_kubernetes(value))
        {
            out.insert(attribute.json_name.clone(), converted);
        }
    }
    out
}

/// Rename the keys of a Kubernetes object to attribute names.
///
/// Every declared attribute is present in the result, absent ones as null;
/// undeclared fields are dropped.
pub fn object_from_kubernetes(
    attributes: &[Attribute],
    map: &Map<String, Value>,
) -> Map<String, Value> {
    attributes
        .iter()
        .map(|attribute| {
            let value = map
                .get(&attribute.json_name)
                .map(|v| attribute.attribute_type.from_kubernetes(v))
                .unwrap_or(Value::Null);
            (attribute.name.clone(), value)
        })
        .collect()
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// Validate a configuration object against a list of attributes
pub fn validate_object(
    attributes: &[Attribute],
    map: &Map<String, Value>,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    for key in map.keys() {
        if !attributes.iter().any(|a| &a.name == key) {
            diagnostics.push(
                Diagnostic::error(
                    "Unsupported argument",
                    format!("An argument named \"{key}\" is not expected here."),
                )
                .with_path(join_path(path, key)),
            );
        }
    }

    for attribute in attributes {
        let attribute_path = join_path(path, &attribute.name);
        let value = map.get(&attribute.name).unwrap_or(&Value::Null);

        if value.is_null() {
            if attribute.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!(
                            "The argument \"{}\" is required, but no definition was found.",
                            attribute.name
                        ),
                    )
                    .with_path(attribute_path),
                );
            }
            continue;
        }

        if !attribute.is_configurable() {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid Configuration for Read-Only Attribute",
                    "Cannot set value for this attribute as the provider has marked it as read-only.",
                )
                .with_path(attribute_path),
            );
            continue;
        }

        validate_value(attribute, value, &attribute_path, diagnostics);
    }
}

fn validate_value(attribute: &Attribute, value: &Value, path: &str, diagnostics: &mut Diagnostics) {
    if !attribute.attribute_type.accepts(value) {
        diagnostics.push(
            Diagnostic::error(
                "Incorrect attribute value type",
                format!(
                    "Inappropriate value for attribute \"{}\": {} required.",
                    attribute.name,
                    attribute.attribute_type.label()
                ),
            )
            .with_path(path),
        );
        return;
    }

    for validator in &attribute.validators {
        if let Err(detail) = validator.check(value) {
            diagnostics.push(Diagnostic::error(validator.summary(), detail).with_path(path));
        }
    }

    validate_elements(&attribute.attribute_type, value, path, diagnostics);
}

fn validate_elements(
    attribute_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Diagnostics,
) {
    match (attribute_type, value) {
        (AttributeType::Object(attributes), Value::Object(map)) => {
            validate_object(attributes, map, path, diagnostics)
        }
        (AttributeType::ListOfObjects(attributes), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                match item {
                    Value::Object(map) => validate_object(attributes, map, &item_path, diagnostics),
                    Value::Null => {}
                    _ => diagnostics.push(
                        Diagnostic::error("Incorrect attribute value type", "object required.")
                            .with_path(item_path),
                    ),
                }
            }
        }
        (AttributeType::MapOfObjects(attributes), Value::Object(map)) => {
            for (key, item) in map {
                let item_path = format!("{path}[{key:?}]");
                match item {
                    Value::Object(inner) => {
                        validate_object(attributes, inner, &item_path, diagnostics)
                    }
                    Value::Null => {}
                    _ => diagnostics.push(
                        Diagnostic::error("Incorrect attribute value type", "object required.")
                            .with_path(item_path),
                    ),
                }
            }
        }
        (AttributeType::List(element), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_element(element, item, &format!("{path}[{i}]"), diagnostics);
            }
        }
        (AttributeType::Map(element), Value::Object(map)) => {
            for (key, item) in map {
                check_element(element, item, &format!("{path}[{key:?}]"), diagnostics);
            }
        }
        _ => {}
    }
}

fn check_element(element: &AttributeType, item: &Value, path: &str, diagnostics: &mut Diagnostics) {
    if item.is_null() {
        return;
    }
    if !element.accepts(item) {
        diagnostics.push(
            Diagnostic::error(
                "Incorrect attribute value type",
                format!("{} required.", element.label()),
            )
            .with_path(path),
        );
        return;
    }
    validate_elements(element, item, path, diagnostics);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;
    use serde_json::json;

    fn bmc_attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("address").required(),
            Attribute::string("credentialsName").required(),
            Attribute::bool("disableCertificateVerification"),
        ]
    }

    fn spec_attributes() -> Vec<Attribute> {
        vec![
            Attribute::object("bmc", bmc_attributes()),
            Attribute::string("bootMACAddress"),
            Attribute::string("bootMode").validator(Validator::one_of(["UEFI", "legacy"])),
            Attribute::string_map("labels"),
            Attribute::dynamic("consumerRef"),
            Attribute::list_of_objects("taints", vec![Attribute::string("effect")]),
            Attribute::string("status").computed(),
        ]
    }

    #[test]
    fn test_to_kubernetes_renames_keys_and_drops_nulls() {
        let config = json!({
            "bmc": {"address": "redfish://10.0.0.1", "credentials_name": "bmc-secret", "disable_certificate_verification": null},
            "boot_mac_address": "00:11:22:33:44:55",
            "boot_mode": null,
            "labels": {"some_label": "x"},
            "consumer_ref": {"apiVersion": "v1", "kind": "Machine"},
            "taints": [{"effect": "NoSchedule"}],
        });

        let out = AttributeType::Object(spec_attributes()).to_kubernetes(&config);
        assert_eq!(
            out,
            json!({
                "bmc": {"address": "redfish://10.0.0.1", "credentialsName": "bmc-secret"},
                "bootMACAddress": "00:11:22:33:44:55",
                "labels": {"some_label": "x"},
                "consumerRef": {"apiVersion": "v1", "kind": "Machine"},
                "taints": [{"effect": "NoSchedule"}],
            })
        );
    }

    #[test]
    fn test_from_kubernetes_fills_nulls_and_drops_unknown() {
        let object = json!({
            "bmc": {"address": "redfish://10.0.0.1"},
            "bootMode": "UEFI",
            "somethingNew": true,
        });

        let out = AttributeType::Object(spec_attributes()).from_kubernetes(&object);
        assert_eq!(out["bmc"]["address"], "redfish://10.0.0.1");
        assert_eq!(out["bmc"]["credentials_name"], Value::Null);
        assert_eq!(out["boot_mode"], "UEFI");
        assert_eq!(out["taints"], Value::Null);
        assert!(out.get("something_new").is_none());
        assert!(out.get("somethingNew").is_none());
    }

    #[test]
    fn test_validate_reports_paths() {
        let config = json!({
            "bmc": {"address": "redfish://10.0.0.1"},
            "boot_mode": "BIOS",
            "taints": [{"effect": 3}],
            "status": "ready",
            "unknown": 1,
        })
        .as_object()
        .cloned()
        .unwrap();

        let mut diagnostics = Diagnostics::new();
        validate_object(&spec_attributes(), &config, "spec", &mut diagnostics);

        let found: Vec<(String, String)> = diagnostics
            .iter()
            .map(|d| (d.summary.clone(), d.path.clone().unwrap_or_default()))
            .collect();

        assert!(found.contains(&("Unsupported argument".into(), "spec.unknown".into())));
        assert!(found.contains(&(
            "Missing required argument".into(),
            "spec.bmc.credentials_name".into()
        )));
        assert!(found.contains(&(
            "Invalid Attribute Value Match".into(),
            "spec.boot_mode".into()
        )));
        assert!(found.contains(&(
            "Incorrect attribute value type".into(),
            "spec.taints[0].effect".into()
        )));
        assert!(found.contains(&(
            "Invalid Configuration for Read-Only Attribute".into(),
            "spec.status".into()
        )));
        assert_eq!(diagnostics.len(), 5);
    }

    #[test]
    fn test_map_element_types_are_checked() {
        let attributes = vec![Attribute::string_map("labels")];
        let config = json!({"labels": {"a": "b", "c": 1}}).as_object().cloned().unwrap();

        let mut diagnostics = Diagnostics::new();
        validate_object(&attributes, &config, "", &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.path.as_deref(), Some("labels[\"c\"]"));
    }
}
