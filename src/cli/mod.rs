//! CLI command implementations

use anyhow::Result;
use clap::{ArgMatches, Command};

pub mod commands;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Create the CLI application
    pub fn app() -> Command {
        Command::new("crd-provider")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Expose Kubernetes custom resources as data sources, manifests and resources")
            .subcommand_negates_reqs(true)
            .subcommand(commands::init::command())
            .subcommand(commands::validate::command())
            .subcommand(commands::info::command())
            .subcommand(commands::types::command())
            .subcommand(commands::schema::command())
            .subcommand(commands::generate::command())
            .subcommand(commands::render::command())
            .subcommand(commands::apply::command())
            .subcommand(commands::get::command())
            .subcommand(commands::delete::command())
            .subcommand(commands::import::command())
    }

    /// Run the CLI application
    pub async fn run(matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("init", sub_matches)) => commands::init::run(sub_matches).await,
            Some(("validate", sub_matches)) => commands::validate::run(sub_matches).await,
            Some(("info", sub_matches)) => commands::info::run(sub_matches).await,
            Some(("types", sub_matches)) => commands::types::run(sub_matches).await,
            Some(("schema", sub_matches)) => commands::schema::run(sub_matches).await,
            Some(("generate", sub_matches)) => commands::generate::run(sub_matches).await,
            Some(("render", sub_matches)) => commands::render::run(sub_matches).await,
            Some(("apply", sub_matches)) => commands::apply::run(sub_matches).await,
            Some(("get", sub_matches)) => commands::get::run(sub_matches).await,
            Some(("delete", sub_matches)) => commands::delete::run(sub_matches).await,
            Some(("import", sub_matches)) => commands::import::run(sub_matches).await,
            _ => {
                // No subcommand provided, show help
                let _ = Self::app().print_help();
                Ok(())
            }
        }
    }
}

/// Common CLI utilities
pub mod utils {
    use crate::config::CONFIG_FILE_NAMES;
    use anyhow::{anyhow, Result};
    use clap::Arg;
    use provider_schema::Diagnostics;
    use std::path::PathBuf;

    /// The `--config` argument shared by every command reading a configuration
    pub fn config_arg() -> Arg {
        Arg::new("config")
            .short('c')
            .long("config")
            .help("Configuration file path")
            .value_name("FILE")
    }

    /// Get configuration file path from arguments or use default
    pub fn get_config_path(matches: &clap::ArgMatches) -> Result<PathBuf> {
        if let Some(config_path) = matches.get_one::<String>("config") {
            return Ok(PathBuf::from(config_path));
        }

        for name in CONFIG_FILE_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(path);
            }
        }

        let user_config = crate::utils::get_config_dir()?.join("config.yaml");
        if user_config.exists() {
            return Ok(user_config);
        }

        Err(anyhow!("No configuration file found. Use --config to specify a file or create one with 'crd-provider init'"))
    }

    /// Load configuration from file
    pub fn load_config(matches: &clap::ArgMatches) -> Result<crate::Config> {
        let config_path = get_config_path(matches)?;
        let mut config = crate::Config::from_file(&config_path)?;
        config.resolve_paths(&config_path);
        Ok(config)
    }

    /// Create CrdProvider instance
    pub fn create_app(config: crate::Config) -> Result<crate::CrdProvider> {
        crate::CrdProvider::new(config)
    }

    /// Create a CrdProvider connected to the configured cluster
    pub async fn connect_app(matches: &clap::ArgMatches) -> Result<crate::CrdProvider> {
        let mut app = create_app(load_config(matches)?)?;
        app.configure().await?;
        Ok(app)
    }

    /// Print diagnostics to stderr; errors when any of them is an error
    pub fn report(diagnostics: &Diagnostics) -> Result<()> {
        for diagnostic in diagnostics {
            eprintln!("{diagnostic}");
        }
        if diagnostics.has_error() {
            return Err(anyhow!("{} problems found", diagnostics.len()));
        }
        Ok(())
    }

    /// Convert a provider error into a CLI error carrying both title and detail
    pub fn provider_error(error: crate::ProviderError) -> anyhow::Error {
        let detail = error.detail();
        if detail.is_empty() {
            anyhow!("{error}")
        } else {
            anyhow!("{error}: {detail}")
        }
    }

    /// Print a state document as YAML
    pub fn print_state(state: &serde_json::Value) -> Result<()> {
        print!("{}", serde_yaml::to_string(state)?);
        Ok(())
    }
}
