//! Schema command implementation

use crate::cli::utils;
use crate::provider::SurfaceKind;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("schema")
        .about("Print the schema of a registered type as JSON")
        .arg(
            clap::Arg::new("type")
                .help("Type name")
                .value_name("TYPE")
                .required(true),
        )
        .arg(
            clap::Arg::new("resource")
                .short('r')
                .long("resource")
                .help("Show the resource schema instead of the data source")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(utils::config_arg())
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let type_name = matches
        .get_one::<String>("type")
        .ok_or_else(|| anyhow!("Missing type name"))?;

    let config = match utils::get_config_path(matches) {
        Ok(_) => utils::load_config(matches)?,
        Err(_) => crate::Config::default(),
    };
    let app = utils::create_app(config)?;
    let registry = app.registry();

    let surface = if matches.get_flag("resource") {
        SurfaceKind::Resource
    } else {
        registry.surface_of(type_name)
    };

    let schema = registry
        .schema(type_name, surface)
        .map_err(utils::provider_error)?;
    println!("{}", serde_json::to_string_pretty(schema)?);

    Ok(())
}
