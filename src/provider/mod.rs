//! Provider surfaces: data sources, manifest data sources and resources

pub mod common;
pub mod data_source;
pub mod import;
pub mod manifest;
pub mod registry;
pub mod resource;

pub use common::{format_id, SurfaceMode};
pub use data_source::DataSource;
pub use import::parse_import_id;
pub use manifest::{render_yaml, ManifestDataSource};
pub use registry::{Registry, SurfaceKind};
pub use resource::{
    ApplyDefaults, OperationContext, Resource, ResourceSettings, DEFAULT_FIELD_MANAGER,
};
