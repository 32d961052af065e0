//! Apply command implementation

use crate::cli::utils;
use crate::InMemoryObjectApi;
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub fn command() -> Command {
    Command::new("apply")
        .about("Apply the declared resources with server-side apply")
        .arg(utils::config_arg())
        .arg(
            clap::Arg::new("dry-run")
                .long("dry-run")
                .help("Apply against an in-memory store instead of the cluster")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Don't print the resulting state")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let app = if matches.get_flag("dry-run") {
        info!("Dry run mode - nothing is sent to the cluster");
        let mut config = utils::load_config(matches)?;
        // An in-memory store never reports status
        for declaration in &mut config.resources {
            if let Some(map) = declaration.config.as_object_mut() {
                map.remove("wait_for");
            }
        }
        utils::create_app(config)?.with_client(Arc::new(InMemoryObjectApi::new()))
    } else {
        utils::connect_app(matches).await?
    };

    let started = Instant::now();
    let outcomes = app.apply_declared().await;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(state) => {
                println!("Applied {}", outcome.label);
                if !matches.get_flag("quiet") {
                    utils::print_state(state)?;
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Failed {}: {}: {}", outcome.label, e, e.detail());
            }
        }
    }

    println!(
        "Applied {}/{} resources in {}",
        outcomes.len() - failed,
        outcomes.len(),
        crate::utils::format_duration(started.elapsed())
    );

    if failed > 0 {
        return Err(anyhow!("{failed} resources failed to apply"));
    }
    Ok(())
}
