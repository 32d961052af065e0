//! Type name lookup for every surface

use super::data_source::DataSource;
use super::manifest::ManifestDataSource;
use super::resource::Resource;
use crate::crds::{builtin_kinds, CrdKind};
use crate::error::{ProviderError, ProviderResult};
use provider_schema::{Diagnostics, Schema};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Which surface a schema lookup refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    DataSource,
    Manifest,
    Resource,
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceKind::DataSource => write!(f, "data source"),
            SurfaceKind::Manifest => write!(f, "manifest"),
            SurfaceKind::Resource => write!(f, "resource"),
        }
    }
}

/// Surfaces by type name.
///
/// A data source and its resource share a type name; manifests carry a
/// `_manifest` suffix.
#[derive(Default)]
pub struct Registry {
    data_sources: BTreeMap<String, DataSource>,
    manifests: BTreeMap<String, ManifestDataSource>,
    resources: BTreeMap<String, Resource>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every compiled-in kind
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        for (kind, with_resource) in builtin_kinds() {
            registry.register_kind(kind, with_resource);
        }
        registry
    }

    /// Register the surfaces of a kind. Returns `false` when the type name is
    /// already taken, leaving the existing surfaces in place.
    pub fn register_kind(&mut self, kind: Arc<dyn CrdKind>, with_resource: bool) -> bool {
        let type_name = kind.type_name();
        if self.data_sources.contains_key(&type_name) {
            warn!("Type {} is already registered, skipping", type_name);
            return false;
        }

        debug!(
            "Registering {} ({}{})",
            type_name,
            kind.api_version(),
            if with_resource { ", with resource" } else { "" }
        );
        self.manifests
            .insert(kind.manifest_type_name(), ManifestDataSource::new(kind.clone()));
        if with_resource {
            self.resources
                .insert(type_name.clone(), Resource::new(kind.clone()));
        }
        self.data_sources.insert(type_name, DataSource::new(kind));
        true
    }

    pub fn data_source(&self, type_name: &str) -> ProviderResult<&DataSource> {
        self.data_sources
            .get(type_name)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    pub fn manifest(&self, type_name: &str) -> ProviderResult<&ManifestDataSource> {
        self.manifests
            .get(type_name)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    pub fn resource(&self, type_name: &str) -> ProviderResult<&Resource> {
        self.resources
            .get(type_name)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    /// The schema registered under `type_name` for the given surface
    pub fn schema(&self, type_name: &str, surface: SurfaceKind) -> ProviderResult<&Schema> {
        match surface {
            SurfaceKind::DataSource => self.data_source(type_name).map(DataSource::schema),
            SurfaceKind::Manifest => self.manifest(type_name).map(ManifestDataSource::schema),
            SurfaceKind::Resource => self.resource(type_name).map(Resource::schema),
        }
    }

    /// Guess the surface of a type name: manifests by suffix, otherwise the
    /// data source.
    pub fn surface_of(&self, type_name: &str) -> SurfaceKind {
        if self.manifests.contains_key(type_name) {
            SurfaceKind::Manifest
        } else {
            SurfaceKind::DataSource
        }
    }

    pub fn data_source_types(&self) -> Vec<&str> {
        self.data_sources.keys().map(String::as_str).collect()
    }

    pub fn manifest_types(&self) -> Vec<&str> {
        self.manifests.keys().map(String::as_str).collect()
    }

    pub fn resource_types(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    /// Every registered type name, sorted and without duplicates
    pub fn type_names(&self) -> Vec<&str> {
        self.data_sources
            .keys()
            .chain(self.manifests.keys())
            .chain(self.resources.keys())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Run the implementation checks of every schema
    pub fn validate_schemas(&self) -> Diagnostics {
        let schemas = self
            .data_sources
            .iter()
            .map(|(name, s)| (name, SurfaceKind::DataSource, s.schema()))
            .chain(
                self.manifests
                    .iter()
                    .map(|(name, s)| (name, SurfaceKind::Manifest, s.schema())),
            )
            .chain(
                self.resources
                    .iter()
                    .map(|(name, s)| (name, SurfaceKind::Resource, s.schema())),
            );

        let mut diagnostics = Diagnostics::new();
        for (type_name, surface, schema) in schemas {
            diagnostics.extend(
                schema
                    .validate_implementation()
                    .prefixed(&format!("{type_name} ({surface})")),
            );
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_type_names() {
        let registry = Registry::with_builtin_kinds();
        assert_eq!(
            registry.type_names(),
            vec![
                "k8s_druid_stackable_tech_druid_cluster_v1alpha1",
                "k8s_druid_stackable_tech_druid_cluster_v1alpha1_manifest",
                "k8s_metal3_io_bare_metal_host_v1alpha1",
                "k8s_metal3_io_bare_metal_host_v1alpha1_manifest",
            ]
        );
        assert_eq!(
            registry.resource_types(),
            vec!["k8s_metal3_io_bare_metal_host_v1alpha1"]
        );
    }

    #[test]
    fn test_builtin_schemas_are_well_formed() {
        let diagnostics = Registry::with_builtin_kinds().validate_schemas();
        assert!(diagnostics.is_empty(), "{diagnostics}");
    }

    #[test]
    fn test_duplicate_registration_is_refused() {
        let mut registry = Registry::with_builtin_kinds();
        assert!(!registry.register_kind(Arc::new(crate::crds::BareMetalHostKind), true));
    }

    #[test]
    fn test_unknown_type() {
        let registry = Registry::with_builtin_kinds();
        let error = registry
            .resource("k8s_druid_stackable_tech_druid_cluster_v1alpha1")
            .err()
            .unwrap();
        assert_eq!(error.to_string(), "Unknown type");
    }
}
