//! Metal3 bare metal provisioning

pub mod baremetalhost;

pub use baremetalhost::{BareMetalHostKind, BareMetalHostSpec};
