//! Provider schema generation from CRD OpenAPI definitions

pub mod config;
pub mod generator;
pub mod result;
pub mod validation;

pub use config::{OrganizationStrategy, OutputConfig};
pub use generator::{manifest_type_name, type_name, GeneratedKind, SchemaGenerator};
pub use result::{GenerationResult, GenerationStatistics, SourceResult};
pub use validation::ValidationMapper;
