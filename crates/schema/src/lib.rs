//! Schema descriptions for provider surfaces
//!
//! A [`Schema`] is a tree of [`Attribute`]s, each of which knows both its
//! provider-facing snake_case name and the Kubernetes JSON field it maps to.
//! The same tree drives configuration validation, translation between the
//! two document shapes and the implementation checks every surface must pass.

pub mod attribute;
pub mod diagnostics;
pub mod naming;
pub mod schema;
pub mod validator;
pub mod value;

pub use attribute::{Attribute, AttributeType};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use naming::{is_valid_attribute_name, snake_case};
pub use schema::{Schema, RESERVED_ROOT_NAMES};
pub use validator::Validator;
