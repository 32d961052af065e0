//! Configuration management for crd-provider

pub mod config;
pub mod declaration;
pub mod provider;
pub mod source;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use config::{Config, CONFIG_FILE_NAMES};
pub use declaration::Declaration;
pub use provider::ProviderSettings;
pub use source::CrdSource;
