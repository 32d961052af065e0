//! Delete command implementation

use crate::cli::utils;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("delete")
        .about("Delete an object and wait until it is gone")
        .arg(
            clap::Arg::new("type")
                .help("Resource type name")
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
    app.delete(type_name, id).await.map_err(utils::provider_error)?;

    println!("Deleted {type_name} {id}");
    Ok(())
}
