//! JSONPath conditions evaluated against live objects

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid JSONPath {path:?}: {reason}")]
pub struct ConditionError {
    pub path: String,
    pub reason: String,
}

/// A JSONPath expression and the value it should select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub jsonpath: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Condition {
    pub fn new(jsonpath: impl Into<String>, value: Option<String>) -> Self {
        Self {
            jsonpath: jsonpath.into(),
            value,
        }
    }

    /// The expression in `$.a.b` form; `{.a.b}` and `.a.b` are accepted too
    pub fn normalized_path(&self) -> String {
        let mut path = self.jsonpath.trim();
        if let Some(inner) = path.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
            path = inner.trim();
        }

        if path.starts_with('$') {
            path.to_string()
        } else if path.starts_with('.') || path.starts_with('[') {
            format!("${path}")
        } else {
            format!("$.{path}")
        }
    }

    /// Check that the expression parses
    pub fn validate(&self) -> Result<(), ConditionError> {
        self.select(&Value::Null).map(|_| ())
    }

    fn select<'a>(&self, object: &'a Value) -> Result<Vec<&'a Value>, ConditionError> {
        let path = self.normalized_path();
        jsonpath_lib::select(object, &path).map_err(|e| ConditionError {
            path: self.jsonpath.clone(),
            reason: format!("{e:?}"),
        })
    }

    /// Whether the object satisfies the condition.
    ///
    /// With a value, some selected node must equal it: strings compare raw,
    /// anything else by its JSON text. Without a value, some selected node
    /// must be non-null.
    pub fn matches(&self, object: &Value) -> Result<bool, ConditionError> {
        let nodes = self.select(object)?;

        Ok(match &self.value {
            Some(expected) => nodes.iter().any(|node| match node {
                Value::String(s) => s == expected,
                other => other.to_string() == *expected,
            }),
            None => nodes.iter().any(|node| !node.is_null()),
        })
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} = {:?}", self.normalized_path(), value),
            None => write!(f, "{} is set", self.normalized_path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn host() -> Value {
        json!({
            "status": {
                "provisioning": {"state": "provisioned"},
                "poweredOn": true,
                "errorCount": 0,
                "operationalStatus": null,
                "conditions": [
                    {"type": "Ready", "status": "False"},
                    {"type": "Available", "status": "True"},
                ],
            }
        })
    }

    #[rstest]
    #[case("{.status.provisioning.state}")]
    #[case(".status.provisioning.state")]
    #[case("$.status.provisioning.state")]
    #[case("status.provisioning.state")]
    fn test_path_forms(#[case] path: &str) {
        let condition = Condition::new(path, Some("provisioned".to_string()));
        assert_eq!(condition.normalized_path(), "$.status.provisioning.state");
        assert!(condition.matches(&host()).unwrap());
    }

    #[rstest]
    #[case(".status.poweredOn", Some("true"), true)]
    #[case(".status.poweredOn", Some("false"), false)]
    #[case(".status.errorCount", Some("0"), true)]
    #[case(".status.conditions[*].status", Some("True"), true)]
    #[case(".status.provisioning", None, true)]
    #[case(".status.operationalStatus", None, false)]
    #[case(".status.missing", None, false)]
    #[case(".status.missing", Some(""), false)]
    fn test_matching(#[case] path: &str, #[case] value: Option<&str>, #[case] expected: bool) {
        let condition = Condition::new(path, value.map(str::to_string));
        assert_eq!(condition.matches(&host()).unwrap(), expected);
    }

    #[test]
    fn test_invalid_path_is_reported() {
        let condition = Condition::new("$.status[", None);
        assert!(condition.validate().is_err());
    }
}
