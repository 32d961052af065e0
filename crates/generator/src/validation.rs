//! Mapping of OpenAPI validation keywords to attribute validators

use provider_crd::ValidationRules;
use provider_schema::{AttributeType, Validator};
use regex::Regex;
use tracing::debug;

pub struct ValidationMapper;

impl ValidationMapper {
    /// Validators for an attribute of the given type
    pub fn validators(rules: &ValidationRules, attribute_type: &AttributeType) -> Vec<Validator> {
        let mut validators = Vec::new();

        match attribute_type {
            AttributeType::String => {
                if !rules.enum_values.is_empty() {
                    validators.push(Validator::StringOneOf(rules.enum_values.clone()));
                }

                if let Some(pattern) = &rules.pattern {
                    // OpenAPI patterns are ECMA regexes; skip the ones the regex crate rejects
                    if Regex::new(pattern).is_ok() {
                        validators.push(Validator::StringRegex(pattern.clone()));
                    } else {
                        debug!("Skipping unsupported pattern {:?}", pattern);
                    }
                }

                if let Some(min) = rules.min_length {
                    validators.push(Validator::StringLengthAtLeast(min));
                }
                if let Some(max) = rules.max_length {
                    validators.push(Validator::StringLengthAtMost(max));
                }
            }
            AttributeType::Int64 => {
                if let Some(min) = rules.minimum {
                    validators.push(Validator::Int64AtLeast(min.ceil() as i64));
                }
                if let Some(max) = rules.maximum {
                    validators.push(Validator::Int64AtMost(max.floor() as i64));
                }
            }
            AttributeType::Float64 | AttributeType::Number => {
                if let Some(min) = rules.minimum {
                    validators.push(Validator::Float64AtLeast(min));
                }
                if let Some(max) = rules.maximum {
                    validators.push(Validator::Float64AtMost(max));
                }
            }
            AttributeType::List(_) | AttributeType::ListOfObjects(_) => {
                if let Some(min) = rules.min_items {
                    validators.push(Validator::ListSizeAtLeast(min));
                }
                if let Some(max) = rules.max_items {
                    validators.push(Validator::ListSizeAtMost(max));
                }
            }
            _ => {}
        }

        validators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_rules() {
        let rules = ValidationRules::from_schema(&json!({
            "type": "string",
            "enum": ["md5", "sha256", "sha512"],
            "minLength": 1,
        }));

        let validators = ValidationMapper::validators(&rules, &AttributeType::String);
        assert_eq!(
            validators,
            vec![
                Validator::one_of(["md5", "sha256", "sha512"]),
                Validator::StringLengthAtLeast(1),
            ]
        );
    }

    #[test]
    fn test_unsupported_pattern_is_skipped() {
        let rules = ValidationRules::from_schema(&json!({
            "type": "string",
            "pattern": "^(?!-)[a-z]+$",
        }));

        assert!(ValidationMapper::validators(&rules, &AttributeType::String).is_empty());
    }

    #[test]
    fn test_integer_bounds() {
        let rules = ValidationRules::from_schema(&json!({
            "type": "integer",
            "minimum": 0,
            "maximum": 65535,
        }));

        assert_eq!(
            ValidationMapper::validators(&rules, &AttributeType::Int64),
            vec![Validator::Int64AtLeast(0), Validator::Int64AtMost(65535)]
        );
    }

    #[test]
    fn test_rules_ignored_for_other_types() {
        let rules = ValidationRules::from_schema(&json!({"enum": ["a"], "minimum": 1}));
        assert!(ValidationMapper::validators(&rules, &AttributeType::Bool).is_empty());
    }
}
