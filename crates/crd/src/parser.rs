//! CRD parser implementation

use crate::schema::CrdSchema;
use crate::types::{Scope, ValidationRules};
use anyhow::{anyhow, Result};
use glob::Pattern;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct CrdParser;

impl Default for CrdParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CrdParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse CRDs from a directory, applying filters
    pub fn parse_from_directory(
        &self,
        dir_path: &Path,
        filters: &[String],
    ) -> Result<Vec<CrdSchema>> {
        info!("Parsing CRDs from directory: {:?}", dir_path);

        if !dir_path.is_dir() {
            return Err(anyhow!("CRD directory does not exist: {:?}", dir_path));
        }

        let mut schemas = Vec::new();

        for entry in WalkDir::new(dir_path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();

            match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml") | Some("yml") => {}
                _ => continue,
            }

            match self.parse_file(path) {
                Ok(mut crd_schemas) => {
                    crd_schemas.retain(|schema| self.matches_filters(schema, filters));
                    schemas.extend(crd_schemas);
                }
                Err(e) => {
                    debug!("Failed to parse {} as CRD: {}", path.display(), e);
                }
            }
        }

        info!("Found {} CRD schemas after filtering", schemas.len());
        Ok(schemas)
    }

    /// Parse every CRD document of a single file
    pub fn parse_file(&self, path: &Path) -> Result<Vec<CrdSchema>> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content, path)
    }

    /// Parse every CRD document of a (possibly multi-document) YAML string
    pub fn parse_str(&self, content: &str, source_path: &Path) -> Result<Vec<CrdSchema>> {
        let mut schemas = Vec::new();

        for document in serde_yaml::Deserializer::from_str(content) {
            let doc = Value::deserialize(document)?;
            if doc.is_null() {
                continue;
            }
            schemas.extend(self.extract_crd_from_document(&doc, source_path)?);
        }

        Ok(schemas)
    }

    /// Extract one schema per served version from a CRD document
    fn extract_crd_from_document(&self, doc: &Value, source_path: &Path) -> Result<Vec<CrdSchema>> {
        match doc.get("kind").and_then(Value::as_str) {
            Some("CustomResourceDefinition") => {}
            _ => return Ok(Vec::new()),
        }

        let name = doc
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("CRD missing metadata.name"))?;

        let spec = doc.get("spec").ok_or_else(|| anyhow!("CRD missing spec"))?;

        let group = spec
            .get("group")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("CRD missing group"))?;

        let names = spec
            .get("names")
            .ok_or_else(|| anyhow!("CRD {name} missing names"))?;

        let kind = names
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("CRD {name} missing names.kind"))?;

        // The CRD name is `<plural>.<group>` when names.plural is absent
        let plural = names
            .get("plural")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                name.split('.')
                    .next()
                    .unwrap_or(name)
                    .to_string()
            });

        let scope = match spec.get("scope").and_then(Value::as_str) {
            Some("Cluster") => Scope::Cluster,
            _ => Scope::Namespaced,
        };

        let versions = spec
            .get("versions")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("CRD {name} missing versions"))?;

        let mut crd_schemas = Vec::new();

        for version_doc in versions {
            let version_name = version_doc
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("CRD {name} version missing name"))?;

            let served = version_doc
                .get("served")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            if !served {
                debug!("Skipping {name} {version_name}: not served");
                continue;
            }

            let schema = version_doc
                .get("schema")
                .and_then(|s| s.get("openAPIV3Schema"))
                .ok_or_else(|| anyhow!("CRD {name} version {version_name} missing openAPIV3Schema"))?;

            crd_schemas.push(CrdSchema {
                name: name.to_string(),
                group: group.to_string(),
                version: version_name.to_string(),
                api_version: format!("{group}/{version_name}"),
                kind: kind.to_string(),
                plural: plural.clone(),
                scope,
                schema: schema.clone(),
                source_path: source_path.to_path_buf(),
                validation_rules: ValidationRules::from_schema(schema),
            });
        }

        Ok(crd_schemas)
    }

    /// Check if a CRD schema matches the given filters
    pub fn matches_filters(&self, schema: &CrdSchema, filters: &[String]) -> bool {
        if filters.is_empty() {
            return true;
        }

        filters.iter().any(|filter| self.matches_filter(schema, filter))
    }

    /// Check if a CRD schema matches a glob pattern on its API version
    fn matches_filter(&self, schema: &CrdSchema, filter: &str) -> bool {
        match Pattern::new(filter) {
            Ok(pattern) => pattern.matches(&schema.api_version),
            Err(_) => false,
        }
    }
}
