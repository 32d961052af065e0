//! Provider operation errors

use provider_schema::{Diagnostic, Diagnostics};

/// Errors returned by provider operations.
///
/// `Display` is the diagnostic title; [`ProviderError::detail`] carries the
/// underlying error text.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("Unable to marshal resource")]
    Marshal(String),

    #[error("Unable to PATCH resource")]
    Patch(String),

    #[error("Unable to GET resource")]
    Get(String),

    #[error("Unable to DELETE resource")]
    Delete(String),

    #[error("Unable to find resource")]
    NotFound {
        kind: String,
        namespace: Option<String>,
        name: String,
    },

    #[error("Unable to unmarshal resource")]
    Unmarshal(String),

    #[error("Provider in offline mode")]
    Offline,

    #[error("Provider not configured")]
    Unconfigured,

    #[error("Error importing resource")]
    ImportId(String),

    #[error("Unable to wait for resource")]
    Wait(String),

    #[error("Unknown type")]
    UnknownType(String),

    #[error("Invalid configuration")]
    InvalidConfiguration(Diagnostics),
}

impl ProviderError {
    /// The underlying error text shown below the title
    pub fn detail(&self) -> String {
        match self {
            ProviderError::Marshal(detail)
            | ProviderError::Patch(detail)
            | ProviderError::Get(detail)
            | ProviderError::Delete(detail)
            | ProviderError::Unmarshal(detail)
            | ProviderError::Wait(detail) => detail.clone(),
            ProviderError::NotFound {
                kind,
                namespace: Some(namespace),
                name,
            } => format!(
                "The {kind} '{name}' was not found in namespace '{namespace}'. \
                 Check that the object exists and that the provider has permission to read it."
            ),
            ProviderError::NotFound {
                kind,
                namespace: None,
                name,
            } => format!(
                "The {kind} '{name}' was not found. \
                 Check that the object exists and that the provider has permission to read it."
            ),
            ProviderError::Offline => {
                "Only manifest data sources are available while the provider is offline.".to_string()
            }
            ProviderError::Unconfigured => {
                "The Kubernetes client has not been configured.".to_string()
            }
            ProviderError::ImportId(id) => format!(
                "Expected import identifier with format 'namespace/name', got: {id:?}"
            ),
            ProviderError::UnknownType(type_name) => {
                format!("No surface is registered under the type name {type_name:?}")
            }
            ProviderError::InvalidConfiguration(diagnostics) => diagnostics.to_string(),
        }
    }

    /// Expand into diagnostics, keeping configuration diagnostics intact
    pub fn into_diagnostics(self) -> Diagnostics {
        match self {
            ProviderError::InvalidConfiguration(diagnostics) => diagnostics,
            other => Diagnostics::from(Diagnostic::from(other)),
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(error: ProviderError) -> Self {
        Diagnostic::error(error.to_string(), error.detail())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
