//! Main configuration structure and implementation

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{CrdSource, Declaration, ProviderSettings};
use provider_generator::OutputConfig;

/// File names searched in the working directory, in order
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    ".crd-provider.yaml",
    ".crd-provider.yml",
    "crd-provider.yaml",
    "crd-provider.yml",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Cluster connection and apply defaults
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Directories of CRD files to expose as additional kinds
    #[serde(default)]
    pub crd_sources: Vec<CrdSource>,

    /// Objects rendered by `render`
    #[serde(default)]
    pub manifests: Vec<Declaration>,

    /// Objects managed by `apply`
    #[serde(default)]
    pub resources: Vec<Declaration>,

    /// Where `generate` writes schema files
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.version != "1.0" {
            return Err(anyhow!(
                "Unsupported configuration version: {}",
                self.version
            ));
        }

        self.provider.validate()?;

        for source in &self.crd_sources {
            source.validate()?;
        }

        let mut names = std::collections::HashSet::new();
        for source in &self.crd_sources {
            if !names.insert(source.name.as_str()) {
                return Err(anyhow!("Duplicate CRD source name: {}", source.name));
            }
        }

        for declaration in self.manifests.iter().chain(&self.resources) {
            declaration.validate()?;
        }

        self.output.validate()?;

        Ok(())
    }

    /// Resolve CRD source paths relative to the directory of the config file
    pub fn resolve_paths(&mut self, config_path: &Path) {
        let Some(base) = config_path.parent() else {
            return;
        };
        for source in &mut self.crd_sources {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }
    }

    /// A configuration with a sample of every section
    pub fn example() -> Self {
        let mut config = Self::default();
        config.provider.field_manager = Some("crd-provider".to_string());
        config.crd_sources.push(CrdSource {
            name: "metal3".to_string(),
            path: PathBuf::from("./crds/metal3"),
            filters: vec!["metal3.io/*".to_string()],
            resources: true,
        });
        config.manifests.push(Declaration::example_druid_cluster());
        config.resources.push(Declaration::example_bare_metal_host());
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            provider: ProviderSettings::default(),
            crd_sources: Vec::new(),
            manifests: Vec::new(),
            resources: Vec::new(),
            output: OutputConfig::default(),
        }
    }
}
