//! Get command implementation

use crate::cli::utils;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("get")
        .about("Read a live object through its data source")
        .arg(
            clap::Arg::new("type")
                .help("Data source type name")
                .value_name("TYPE")
                .required(true),
        )
        .arg(
            clap::Arg::new("id")
                .help("Object as namespace/name, or name for cluster-scoped kinds")
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
        .ok_or_else(|| anyhow!("Missing object id"))?;

    let app = utils::connect_app(matches).await?;
    let state = app.get(type_name, id).await.map_err(utils::provider_error)?;
    utils::print_state(&state)
}
