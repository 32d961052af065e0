//! Validate command implementation

use crate::cli::utils;
use anyhow::Result;
use clap::{ArgMatches, Command};
use tracing::info;

pub fn command() -> Command {
    Command::new("validate")
        .about("Validate configuration file, schemas and declared objects")
        .arg(utils::config_arg())
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    info!("Validating configuration file");

    let config = utils::load_config(matches)?;
    let app = utils::create_app(config)?;

    utils::report(&app.validate())?;

    let config = app.config();
    println!("Configuration file is valid!");
    println!("Version: {}", config.version);
    println!("CRD sources: {}", config.crd_sources.len());
    println!("Manifests: {}", config.manifests.len());
    println!("Resources: {}", config.resources.len());
    println!("Registered types: {}", app.registry().type_names().len());

    for declaration in config.manifests.iter().chain(&config.resources) {
        println!("  - {}", declaration.label());
    }

    Ok(())
}
