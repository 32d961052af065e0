//! Configuration types for the generator

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base path for generated files
    pub base_path: PathBuf,

    /// Organization strategy for output files
    pub organization: OrganizationStrategy,
}

impl OutputConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_path.to_string_lossy().is_empty() {
            return Err(anyhow!("Base path cannot be empty"));
        }
        Ok(())
    }

    /// Directory a schema of the given API version is written to
    pub fn directory_for(&self, output_path: &Path, api_version: &str) -> PathBuf {
        match self.organization {
            OrganizationStrategy::ApiVersion => output_path.join(api_version.replace('/', "_")),
            OrganizationStrategy::Flat => output_path.to_path_buf(),
            OrganizationStrategy::Hierarchical => match api_version.split_once('/') {
                Some((group, version)) => output_path.join(group).join(version),
                None => output_path.join(api_version),
            },
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("./generated"),
            organization: OrganizationStrategy::ApiVersion,
        }
    }
}

/// Organization strategy for output files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStrategy {
    /// Organize by API version (e.g., metal3.io_v1alpha1/)
    ApiVersion,

    /// Flat organization (all files in one directory)
    Flat,

    /// Hierarchical organization (metal3.io/v1alpha1/)
    Hierarchical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_for_each_strategy() {
        let base = Path::new("/out");
        let mut config = OutputConfig::default();

        assert_eq!(
            config.directory_for(base, "metal3.io/v1alpha1"),
            PathBuf::from("/out/metal3.io_v1alpha1")
        );

        config.organization = OrganizationStrategy::Flat;
        assert_eq!(config.directory_for(base, "metal3.io/v1alpha1"), PathBuf::from("/out"));

        config.organization = OrganizationStrategy::Hierarchical;
        assert_eq!(
            config.directory_for(base, "metal3.io/v1alpha1"),
            PathBuf::from("/out/metal3.io/v1alpha1")
        );
    }
}
