//! Import command implementation

use crate::cli::utils;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("import")
        .about("Print the state an existing object would be imported with")
        .arg(
            clap::Arg::new("type")
                .help("Resource type name")
                .value_name("TYPE")
                .required(true),
        )
        .arg(
            clap::Arg::new("id")
                .help("Import ID: namespace/name, or name for cluster-scoped kinds")
                .value_name("ID")
                .required(true),
        )
        .arg(utils::config_arg())
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let type_name = matches
        .get_one::<String>("type")
        .ok_or_else(|| anyhow!("Missing type name"))?;
    let id = matches
        .get_one::<String>("id")
        .ok_or_else(|| anyhow!("Missing import id"))?;

    let app = utils::connect_app(matches).await?;
    let state = app
        .import_resource(type_name, id)
        .await
        .map_err(utils::provider_error)?;
    utils::print_state(&state)
}
