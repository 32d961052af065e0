//! Attribute value validators

use crate::attribute::AttributeType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A constraint on an attribute's configured value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Validator {
    /// String must be one of the listed values
    StringOneOf(Vec<String>),

    /// String must match the regular expression
    StringRegex(String),

    /// String must have at least this many characters
    StringLengthAtLeast(usize),

    /// String must have at most this many characters
    StringLengthAtMost(usize),

    /// Integer must be at least this value
    Int64AtLeast(i64),

    /// Integer must be at most this value
    Int64AtMost(i64),

    /// Number must be at least this value
    Float64AtLeast(f64),

    /// Number must be at most this value
    Float64AtMost(f64),

    /// List must have at least this many elements
    ListSizeAtLeast(usize),

    /// List must have at most this many elements
    ListSizeAtMost(usize),
}

impl Validator {
    /// Shorthand for [`Validator::StringOneOf`]
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::StringOneOf(values.into_iter().map(Into::into).collect())
    }

    /// Whether this validator can be attached to an attribute of the given type
    pub fn applies_to(&self, attribute_type: &AttributeType) -> bool {
        match self {
            Validator::StringOneOf(_)
            | Validator::StringRegex(_)
            | Validator::StringLengthAtLeast(_)
            | Validator::StringLengthAtMost(_) => matches!(attribute_type, AttributeType::String),
            Validator::Int64AtLeast(_) | Validator::Int64AtMost(_) => {
                matches!(attribute_type, AttributeType::Int64)
            }
            Validator::Float64AtLeast(_) | Validator::Float64AtMost(_) => matches!(
                attribute_type,
                AttributeType::Float64 | AttributeType::Number | AttributeType::Int64
            ),
            Validator::ListSizeAtLeast(_) | Validator::ListSizeAtMost(_) => matches!(
                attribute_type,
                AttributeType::List(_) | AttributeType::ListOfObjects(_)
            ),
        }
    }

    /// Check the validator's own definition
    pub fn check_definition(&self) -> Result<(), String> {
        match self {
            Validator::StringRegex(pattern) => Regex::new(pattern)
                .map(|_| ())
                .map_err(|e| format!("invalid regular expression {pattern:?}: {e}")),
            Validator::StringOneOf(values) if values.is_empty() => {
                Err("one-of validator declares no allowed values".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Summary used for diagnostics raised by this validator
    pub fn summary(&self) -> &'static str {
        match self {
            Validator::StringOneOf(_) | Validator::StringRegex(_) => {
                "Invalid Attribute Value Match"
            }
            Validator::StringLengthAtLeast(_) | Validator::StringLengthAtMost(_) => {
                "Invalid Attribute Value Length"
            }
            _ => "Invalid Attribute Value",
        }
    }

    /// Check a configured value, returning the diagnostic detail on failure.
    ///
    /// Values of a type the validator does not handle pass; type mismatches
    /// are reported separately.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::StringOneOf(allowed) => match value.as_str() {
                Some(s) if !allowed.iter().any(|a| a == s) => Err(format!(
                    "Attribute value must be one of: {}, got: {s:?}",
                    allowed
                        .iter()
                        .map(|a| format!("{a:?}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
                _ => Ok(()),
            },
            Validator::StringRegex(pattern) => match value.as_str() {
                Some(s) => {
                    let regex = Regex::new(pattern).map_err(|e| e.to_string())?;
                    if regex.is_match(s) {
                        Ok(())
                    } else {
                        Err(format!(
                            "Attribute value must match regular expression '{pattern}', got: {s:?}"
                        ))
                    }
                }
                None => Ok(()),
            },
            Validator::StringLengthAtLeast(min) => match value.as_str() {
                Some(s) if s.chars().count() < *min => Err(format!(
                    "Attribute string length must be at least {min}, got: {}",
                    s.chars().count()
                )),
                _ => Ok(()),
            },
            Validator::StringLengthAtMost(max) => match value.as_str() {
                Some(s) if s.chars().count() > *max => Err(format!(
                    "Attribute string length must be at most {max}, got: {}",
                    s.chars().count()
                )),
                _ => Ok(()),
            },
            Validator::Int64AtLeast(min) => match value.as_i64() {
                Some(n) if n < *min => Err(format!("Attribute must be at least {min}, got: {n}")),
                _ => Ok(()),
            },
            Validator::Int64AtMost(max) => match value.as_i64() {
                Some(n) if n > *max => Err(format!("Attribute must be at most {max}, got: {n}")),
                _ => Ok(()),
            },
            Validator::Float64AtLeast(min) => match value.as_f64() {
                Some(n) if n < *min => Err(format!("Attribute must be at least {min}, got: {n}")),
                _ => Ok(()),
            },
            Validator::Float64AtMost(max) => match value.as_f64() {
                Some(n) if n > *max => Err(format!("Attribute must be at most {max}, got: {n}")),
                _ => Ok(()),
            },
            Validator::ListSizeAtLeast(min) => match value.as_array() {
                Some(items) if items.len() < *min => Err(format!(
                    "Attribute list must contain at least {min} elements, got: {}",
                    items.len()
                )),
                _ => Ok(()),
            },
            Validator::ListSizeAtMost(max) => match value.as_array() {
                Some(items) if items.len() > *max => Err(format!(
                    "Attribute list must contain at most {max} elements, got: {}",
                    items.len()
                )),
                _ => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_of() {
        let validator = Validator::one_of(["Always", "IfNotPresent", "Never"]);
        assert!(validator.check(&json!("Always")).is_ok());
        let err = validator.check(&json!("Sometimes")).unwrap_err();
        assert!(err.contains("\"IfNotPresent\""));
        assert!(err.contains("\"Sometimes\""));
    }

    #[test]
    fn test_regex() {
        let validator = Validator::StringRegex(r"^[a-z]+$".to_string());
        assert!(validator.check(&json!("abc")).is_ok());
        assert!(validator.check(&json!("ABC")).is_err());
        assert!(Validator::StringRegex("(".to_string())
            .check_definition()
            .is_err());
    }

    #[test]
    fn test_numeric_bounds() {
        assert!(Validator::Int64AtLeast(1).check(&json!(0)).is_err());
        assert!(Validator::Int64AtLeast(1).check(&json!(1)).is_ok());
        assert!(Validator::Int64AtMost(65535).check(&json!(65536)).is_err());
        assert!(Validator::Float64AtMost(100.0).check(&json!(99.5)).is_ok());
    }

    #[test]
    fn test_list_size() {
        assert!(Validator::ListSizeAtLeast(1).check(&json!([])).is_err());
        assert!(Validator::ListSizeAtMost(1).check(&json!(["a"])).is_ok());
    }

    #[test]
    fn test_applies_to() {
        assert!(Validator::StringLengthAtLeast(1).applies_to(&AttributeType::String));
        assert!(!Validator::StringLengthAtLeast(1).applies_to(&AttributeType::Int64));
        assert!(Validator::ListSizeAtLeast(1)
            .applies_to(&AttributeType::List(Box::new(AttributeType::String))));
        assert!(!Validator::Int64AtLeast(0).applies_to(&AttributeType::Bool));
    }
}
