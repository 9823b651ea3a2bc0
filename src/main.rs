//! ecsview CLI entry point.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use ecsview::cli::commands;
use ecsview::cli::{handle_error, Cli, Commands};
use ecsview::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => handle_error(&err, json_mode),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.effective_config()?;
    let _logger = LoggerImpl::init(&config.logging)?;
    let options = cli.output_options(&config);

    match cli.command.unwrap_or_default() {
        Commands::Tree(args) => {
            let aggregator = commands::connect(&config).await?;
            commands::tree::execute(args, &aggregator, &options).await
        }
        Commands::Stream(args) => {
            let aggregator = commands::connect(&config).await?;
            commands::stream::execute(args, &aggregator, &options).await
        }
        Commands::Config(args) => commands::config::execute(args, &config, options.json),
    }
}
