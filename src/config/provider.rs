//! Cluster connection settings

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::provider::ApplyDefaults;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Path to a kubeconfig file; `~` and environment variables are expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Default field manager for server-side apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_manager: Option<String>,

    /// Default for forcing apply conflicts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_conflicts: Option<bool>,

    /// Never contact a cluster; only manifests are available
    #[serde(default)]
    pub offline: bool,
}

impl ProviderSettings {
    pub fn validate(&self) -> Result<()> {
        if matches!(&self.field_manager, Some(manager) if manager.trim().is_empty()) {
            return Err(anyhow!("Field manager cannot be empty"));
        }
        if matches!(&self.kubeconfig, Some(path) if path.trim().is_empty()) {
            return Err(anyhow!("Kubeconfig path cannot be empty"));
        }
        Ok(())
    }

    /// The expanded kubeconfig path, if one is configured
    pub fn kubeconfig_path(&self) -> Result<Option<PathBuf>> {
        self.kubeconfig
            .as_deref()
            .map(|path| {
                shellexpand::full(path)
                    .map(|expanded| PathBuf::from(expanded.as_ref()))
                    .map_err(|e| anyhow!("Failed to expand kubeconfig path {path:?}: {e}"))
            })
            .transpose()
    }

    pub fn apply_defaults(&self) -> ApplyDefaults {
        ApplyDefaults {
            field_manager: self.field_manager.clone(),
            force_conflicts: self.force_conflicts,
        }
    }
}
