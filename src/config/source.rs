//! CRD source configuration

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A directory of CRD files whose kinds are exposed at runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrdSource {
    /// Name of the source
    pub name: String,

    /// Directory searched recursively for `.yaml`/`.yml` files
    pub path: PathBuf,

    /// Glob patterns on the API version (`metal3.io/*`); empty keeps all
    #[serde(default)]
    pub filters: Vec<String>,

    /// Whether the kinds also get a resource
    #[serde(default)]
    pub resources: bool,
}

impl CrdSource {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(anyhow!("CRD source name cannot be empty"));
        }

        if self.path.to_string_lossy().is_empty() {
            return Err(anyhow!("CRD source {} has an empty path", self.name));
        }

        for filter in &self.filters {
            glob::Pattern::new(filter)
                .map_err(|e| anyhow!("Invalid filter {:?} in CRD source {}: {}", filter, self.name, e))?;
        }

        Ok(())
    }
}
