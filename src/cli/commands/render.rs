//! Render command implementation

use crate::cli::utils;
use anyhow::Result;
use clap::{ArgMatches, Command};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

pub fn command() -> Command {
    Command::new("render")
        .about("Render the declared manifests as YAML without contacting a cluster")
        .arg(utils::config_arg())
        .arg(
            clap::Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .help("Write one file per manifest instead of printing")
                .value_name("DIR"),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = utils::load_config(matches)?;
    let app = utils::create_app(config)?;

    let Some(output_dir) = matches.get_one::<String>("output-dir").map(PathBuf::from) else {
        print!("{}", app.render_declared().map_err(utils::provider_error)?);
        return Ok(());
    };

    crate::utils::ensure_directory(&output_dir)?;

    for declaration in &app.config().manifests {
        let state = app
            .render_manifest(&declaration.type_name, &declaration.config)
            .map_err(utils::provider_error)?;
        let yaml = state.get("yaml").and_then(Value::as_str).unwrap_or_default();
        let id = state.get("id").and_then(Value::as_str).unwrap_or_default();

        let path = output_dir.join(format!(
            "{}.yaml",
            crate::utils::sanitize_filename(&format!("{}_{}", declaration.type_name, id))
        ));
        std::fs::write(&path, yaml)?;
        info!("Rendered {} to {}", declaration.label(), path.display());
    }

    println!(
        "Rendered {} manifests to {}",
        app.config().manifests.len(),
        output_dir.display()
    );
    Ok(())
}
