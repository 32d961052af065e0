//! Stackable Data Platform products

pub mod commons;
pub mod druid;

pub use druid::{DruidClusterKind, DruidClusterSpec};
