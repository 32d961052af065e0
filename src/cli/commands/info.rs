//! Info command implementation

use crate::cli::utils;
use crate::crds::CrdKind;
use anyhow::Result;
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("info")
        .about("Show tool information")
        .arg(
            clap::Arg::new("detailed")
                .short('d')
                .long("detailed")
                .help("Show detailed information")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(utils::config_arg())
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let detailed = matches.get_flag("detailed");

    println!("crd-provider - Kubernetes custom resources as provider types");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));

    if !detailed {
        return Ok(());
    }

    println!("\nBuilt-in kinds:");
    for (kind, with_resource) in crate::crds::builtin_kinds() {
        println!(
            "  - {} {} ({}{})",
            kind.api_version(),
            kind.kind(),
            if kind.namespaced() { "namespaced" } else { "cluster" },
            if with_resource { ", resource" } else { "" }
        );
    }

    match utils::get_config_path(matches) {
        Ok(path) => {
            println!("\nConfiguration: {}", path.display());
            let config = utils::load_config(matches)?;
            println!("Offline: {}", config.provider.offline);
            for source in &config.crd_sources {
                match crate::utils::find_yaml_files(&source.path) {
                    Ok(files) => println!(
                        "  - {} ({}): {} YAML files",
                        source.name,
                        source.path.display(),
                        files.len()
                    ),
                    Err(e) => println!("  - {} ({}): {}", source.name, source.path.display(), e),
                }
            }
        }
        Err(_) => println!("\nNo configuration file found"),
    }

    Ok(())
}
