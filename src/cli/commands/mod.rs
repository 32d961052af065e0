//! CLI command modules

pub mod apply;
pub mod delete;
pub mod generate;
pub mod get;
pub mod import;
pub mod info;
pub mod init;
pub mod render;
pub mod schema;
pub mod types;
pub mod validate;
