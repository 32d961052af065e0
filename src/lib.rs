//! CRD Provider Library
//!
//! Exposes Kubernetes CustomResourceDefinitions as typed provider surfaces:
//! data sources reading live objects, manifest data sources rendering YAML
//! offline, and resources managed with server-side apply.

pub mod cli;
pub mod client;
pub mod config;
pub mod crds;
pub mod error;
pub mod provider;
pub mod utils;
pub mod wait;

pub use client::{ClientError, InMemoryObjectApi, KubeObjectApi, ObjectApi, ObjectKey};
pub use config::{Config, CrdSource, Declaration, ProviderSettings};
pub use crds::{BareMetalHostKind, CrdKind, DruidClusterKind, Manifest, OpenApiKind};
pub use error::{ProviderError, ProviderResult};
pub use provider::{
    DataSource, ManifestDataSource, OperationContext, Registry, Resource, SurfaceKind,
};

use anyhow::{Context, Result};
use provider_crd::CrdParser;
use provider_generator::{GenerationResult, SchemaGenerator, SourceResult};
use provider_schema::{Diagnostic, Diagnostics};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of applying one declared resource
#[derive(Debug)]
pub struct DeclarationOutcome {
    pub label: String,
    pub result: ProviderResult<Value>,
}

/// Main application context that coordinates all components
pub struct CrdProvider {
    config: Config,
    registry: Registry,
    crd_parser: CrdParser,
    generator: SchemaGenerator,
    api: Option<Arc<dyn ObjectApi>>,
}

impl CrdProvider {
    /// Create a provider with the built-in kinds and every configured CRD source
    pub fn new(config: Config) -> Result<Self> {
        let crd_parser = CrdParser::new();
        let generator = SchemaGenerator::new(config.output.clone());
        let mut registry = Registry::with_builtin_kinds();

        for source in &config.crd_sources {
            let schemas = crd_parser
                .parse_from_directory(&source.path, &source.filters)
                .with_context(|| format!("Failed to load CRD source {}", source.name))?;

            let mut registered = 0;
            for schema in &schemas {
                let kind = OpenApiKind::from_crd(&generator, schema);
                if registry.register_kind(Arc::new(kind), source.resources) {
                    registered += 1;
                }
            }
            info!(
                "Registered {} kinds from CRD source {}",
                registered, source.name
            );
        }

        Ok(Self {
            config,
            registry,
            crd_parser,
            generator,
            api: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_offline(&self) -> bool {
        self.config.provider.offline
    }

    /// Connect to the cluster unless the provider is offline
    pub async fn configure(&mut self) -> Result<()> {
        if self.is_offline() {
            info!("Provider is offline, skipping cluster connection");
            return Ok(());
        }

        let kubeconfig = self.config.provider.kubeconfig_path()?;
        let api = KubeObjectApi::from_settings(
            kubeconfig.as_deref(),
            self.config.provider.context.as_deref(),
        )
        .await
        .context("Failed to create Kubernetes client")?;

        self.api = Some(Arc::new(api));
        Ok(())
    }

    /// Use the given object access instead of a cluster connection
    pub fn with_client(mut self, api: Arc<dyn ObjectApi>) -> Self {
        self.api = Some(api);
        self
    }

    fn context(&self) -> ProviderResult<OperationContext> {
        match &self.api {
            Some(api) => Ok(OperationContext::new(
                Arc::clone(api),
                self.config.provider.apply_defaults(),
            )),
            None if self.is_offline() => Err(ProviderError::Offline),
            None => Err(ProviderError::Unconfigured),
        }
    }

    pub async fn read_data_source(&self, type_name: &str, config: &Value) -> ProviderResult<Value> {
        let data_source = self.registry.data_source(type_name)?;
        let ctx = self.context()?;
        data_source.read(ctx.api.as_ref(), config).await
    }

    /// Read a live object by `"namespace/name"`
    pub async fn get(&self, type_name: &str, id: &str) -> ProviderResult<Value> {
        let data_source = self.registry.data_source(type_name)?;
        let (namespace, name) = provider::parse_import_id(id, data_source.kind().namespaced())?;
        let config = json!({"metadata": {"name": name, "namespace": namespace}});
        self.read_data_source(type_name, &strip_nulls(config)).await
    }

    /// Render a manifest; never contacts a cluster
    pub fn render_manifest(&self, type_name: &str, config: &Value) -> ProviderResult<Value> {
        self.registry.manifest(type_name)?.read(config)
    }

    pub async fn create_resource(&self, type_name: &str, config: &Value) -> ProviderResult<Value> {
        let resource = self.registry.resource(type_name)?;
        resource.create(&self.context()?, config).await
    }

    pub async fn update_resource(&self, type_name: &str, config: &Value) -> ProviderResult<Value> {
        let resource = self.registry.resource(type_name)?;
        resource.update(&self.context()?, config).await
    }

    pub async fn read_resource(&self, type_name: &str, state: &Value) -> ProviderResult<Option<Value>> {
        let resource = self.registry.resource(type_name)?;
        resource.read(&self.context()?, state).await
    }

    pub async fn delete_resource(&self, type_name: &str, state: &Value) -> ProviderResult<()> {
        let resource = self.registry.resource(type_name)?;
        resource.delete(&self.context()?, state).await
    }

    /// Delete an object by `"namespace/name"`
    pub async fn delete(&self, type_name: &str, id: &str) -> ProviderResult<()> {
        let resource = self.registry.resource(type_name)?;
        let (namespace, name) = provider::parse_import_id(id, resource.kind().namespaced())?;
        let state = json!({"metadata": {"name": name, "namespace": namespace}});
        resource.delete(&self.context()?, &strip_nulls(state)).await
    }

    pub async fn import_resource(&self, type_name: &str, id: &str) -> ProviderResult<Value> {
        let resource = self.registry.resource(type_name)?;
        resource.import(&self.context()?, id).await
    }

    /// Check every schema and every declared object
    pub fn validate(&self) -> Diagnostics {
        let mut diagnostics = self.registry.validate_schemas();

        for declaration in &self.config.manifests {
            let found = self
                .registry
                .manifest(&declaration.type_name)
                .map(|manifest| manifest.schema().validate_config(&strip_type_fields(&declaration.config)));
            diagnostics.extend(declaration_diagnostics(declaration, found));
        }

        for declaration in &self.config.resources {
            let found = self.registry.resource(&declaration.type_name).map(|resource| {
                let mut found = resource
                    .schema()
                    .validate_config(&strip_type_fields(&declaration.config));
                if let Err(e) = provider::ResourceSettings::from_document(&declaration.config) {
                    found.extend(e.into_diagnostics());
                }
                found
            });
            diagnostics.extend(declaration_diagnostics(declaration, found));
        }

        diagnostics
    }

    /// Render every declared manifest as one multi-document YAML stream
    pub fn render_declared(&self) -> ProviderResult<String> {
        let mut documents = Vec::new();
        for declaration in &self.config.manifests {
            let state = self.render_manifest(&declaration.type_name, &declaration.config)?;
            if let Some(yaml) = state.get("yaml").and_then(Value::as_str) {
                documents.push(yaml.to_string());
            }
        }
        Ok(documents.join("---\n"))
    }

    /// Apply every declared resource in order, continuing past failures
    pub async fn apply_declared(&self) -> Vec<DeclarationOutcome> {
        let mut outcomes = Vec::new();
        for declaration in &self.config.resources {
            let label = declaration.label();
            info!("Applying {}", label);

            let result = self
                .create_resource(&declaration.type_name, &declaration.config)
                .await;
            if let Err(e) = &result {
                error!("Failed to apply {}: {}: {}", label, e, e.detail());
            }
            outcomes.push(DeclarationOutcome { label, result });
        }
        outcomes
    }

    /// Write schema files for every configured CRD source
    pub async fn generate(&self) -> Result<GenerationResult> {
        info!("Generating schemas for {} CRD sources", self.config.crd_sources.len());
        let mut results = Vec::new();

        for source in &self.config.crd_sources {
            let output_path = self.config.output.base_path.join(&source.name);
            let result = match self
                .crd_parser
                .parse_from_directory(&source.path, &source.filters)
            {
                Ok(schemas) => self.generator.generate(&schemas, &output_path).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(mut result) => {
                    result.source_name = source.name.clone();
                    results.push(result);
                }
                Err(e) => {
                    warn!("Failed to process source {}: {}", source.name, e);
                    let mut result = SourceResult::new(source.name.clone(), output_path);
                    result.errors.push(e.to_string());
                    results.push(result);
                }
            }
        }

        Ok(GenerationResult::from_results(
            self.config.crd_sources.len(),
            results,
        ))
    }
}

fn strip_type_fields(config: &Value) -> Value {
    provider::common::strip_type_fields(config)
}

fn strip_nulls(document: Value) -> Value {
    match document {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key, strip_nulls(value)))
                .collect(),
        ),
        other => other,
    }
}

fn declaration_diagnostics(
    declaration: &Declaration,
    found: ProviderResult<Diagnostics>,
) -> Diagnostics {
    let label = declaration.label();
    match found {
        Ok(diagnostics) => diagnostics.prefixed(&label),
        Err(e) => Diagnostics::from(Diagnostic::from(e).with_path(label)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_provider_only_renders() {
        let mut config = Config::example();
        config.crd_sources.clear();
        config.provider.offline = true;

        let mut provider = CrdProvider::new(config).unwrap();
        provider.configure().await.unwrap();

        assert!(provider.render_declared().unwrap().contains("kind: DruidCluster"));

        let outcomes = provider.apply_declared().await;
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].result, Err(ProviderError::Offline)));

        let error = provider
            .get("k8s_metal3_io_bare_metal_host_v1alpha1", "metal3/node-0")
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::Offline));
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let provider = CrdProvider::new(Config::default()).unwrap();
        let error = provider
            .import_resource("k8s_metal3_io_bare_metal_host_v1alpha1", "metal3/node-0")
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Provider not configured");
    }

    #[test]
    fn test_example_configuration_validates() {
        let mut config = Config::example();
        config.crd_sources.clear();
        let provider = CrdProvider::new(config).unwrap();

        let diagnostics = provider.validate();
        assert!(diagnostics.is_empty(), "{diagnostics}");
    }

    #[test]
    fn test_unknown_declared_type_is_reported() {
        let mut config = Config::default();
        config.manifests.push(Declaration::new(
            "k8s_example_com_widget_v1_manifest",
            json!({"metadata": {"name": "w"}}),
        ));
        let provider = CrdProvider::new(config).unwrap();

        let diagnostics = provider.validate();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.iter().all(|d| d.summary == "Unknown type"));
    }
}
