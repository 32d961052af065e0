//! Generate command implementation

use crate::cli::utils;
use anyhow::Result;
use clap::{ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

pub fn command() -> Command {
    Command::new("generate")
        .about("Write schema files for the configured CRD sources")
        .arg(utils::config_arg())
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Output directory")
                .value_name("DIR"),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    info!("Starting schema generation");

    let mut config = utils::load_config(matches)?;

    // Override output path if specified
    if let Some(output_path) = matches.get_one::<String>("output") {
        config.output.base_path = PathBuf::from(output_path);
    }

    let app = utils::create_app(config)?;
    let result = app.generate().await?;

    println!("Generation completed!");
    println!(
        "Sources processed: {}/{}",
        result.sources_processed, result.total_sources
    );
    println!("Files generated: {}", result.statistics.files_generated);
    println!(
        "Processing time: {}ms",
        result.statistics.total_processing_time_ms
    );

    for source_result in &result.results {
        println!(
            "  {}: {} files generated in {}",
            source_result.source_name,
            source_result.files_generated,
            source_result.output_path.display()
        );
        for warning in &source_result.warnings {
            println!("    Warning: {warning}");
        }
        for error in &source_result.errors {
            eprintln!("    Error: {error}");
        }
    }

    if result.statistics.error_count > 0 {
        return Err(anyhow::anyhow!(
            "Generation finished with {} errors",
            result.statistics.error_count
        ));
    }

    Ok(())
}
