//! Object access against the Kubernetes API

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

pub mod kubernetes;
pub mod memory;

pub use kubernetes::KubeObjectApi;
pub use memory::InMemoryObjectApi;

/// Address of a single custom object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,

    /// `None` for cluster-scoped kinds
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{} {}/{}", self.kind, namespace, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// Server-side apply parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyParams {
    pub field_manager: String,
    pub force: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    NotFound(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

/// Get, apply and delete custom objects as JSON documents
#[async_trait]
pub trait ObjectApi: Send + Sync {
    async fn get(&self, key: &ObjectKey) -> Result<Value, ClientError>;

    /// Server-side apply `object`, returning the object the server stored
    async fn apply(
        &self,
        key: &ObjectKey,
        object: &Value,
        params: &ApplyParams,
    ) -> Result<Value, ClientError>;

    async fn delete(&self, key: &ObjectKey) -> Result<(), ClientError>;
}
