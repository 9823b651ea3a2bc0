//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::domain::errors::DomainError;
use crate::domain::models::{ColorChoice, Config};
use crate::infrastructure::config::ConfigLoader;
use commands::config::ConfigArgs;
use commands::stream::StreamArgs;
use commands::tree::TreeArgs;
use commands::OutputOptions;

/// Inspect ECS clusters, their services and the tasks behind them
#[derive(Parser, Debug)]
#[command(name = "ecsview", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (replaces ecsview.yaml and ecsview.local.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// AWS region override
    #[arg(long, global = true)]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch everything, then print the whole tree (default)
    Tree(TreeArgs),
    /// Print each cluster as soon as it is complete
    Stream(StreamArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

impl Default for Commands {
    fn default() -> Self {
        Self::Tree(TreeArgs::default())
    }
}

impl Cli {
    /// Load configuration and apply command-line overrides
    pub fn effective_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };

        if let Some(region) = &self.region {
            config.aws.region = Some(region.clone());
        }
        if self.no_color {
            config.output.color = ColorChoice::Never;
        }
        Ok(config)
    }

    /// Resolve presentation options against the terminal
    pub fn output_options(&self, config: &Config) -> OutputOptions {
        OutputOptions {
            json: self.json,
            use_colors: !self.json && output::use_colors(config.output.color),
            style: config.output.style,
            spinner: output::progress::spinner_enabled(self.json),
        }
    }
}

/// Print a fatal error to stderr and return the failure exit code
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ExitCode {
    let hint = error_hint(err);
    if json_mode {
        let mut body = serde_json::json!({ "error": format!("{err:#}") });
        if let Some(hint) = hint {
            body["hint"] = hint.into();
        }
        eprintln!("{body}");
    } else {
        eprintln!("error: {err:#}");
        if let Some(hint) = hint {
            eprintln!("hint: {hint}");
        }
    }
    ExitCode::FAILURE
}

/// Extra guidance for errors that usually come from the environment
fn error_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DomainError>())
        .any(DomainError::is_discovery_failure)
        .then_some("check AWS credentials, region and endpoint settings")
}
