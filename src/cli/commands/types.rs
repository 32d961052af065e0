//! Types command implementation

use crate::cli::utils;
use crate::provider::SurfaceKind;
use anyhow::Result;
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("types")
        .about("List registered data source, manifest and resource types")
        .arg(utils::config_arg())
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = match utils::get_config_path(matches) {
        Ok(_) => utils::load_config(matches)?,
        Err(_) => crate::Config::default(),
    };
    let app = utils::create_app(config)?;
    let registry = app.registry();

    let sections = [
        (SurfaceKind::DataSource, registry.data_source_types()),
        (SurfaceKind::Manifest, registry.manifest_types()),
        (SurfaceKind::Resource, registry.resource_types()),
    ];
    for (surface, types) in sections {
        println!("{} types:", surface);
        for type_name in types {
            println!("  {type_name}");
        }
    }

    Ok(())
}
