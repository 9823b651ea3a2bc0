//! Implementation of the `ecsview stream` command.
//!
//! Prints each cluster as soon as its subtree is complete. In JSON mode
//! every cluster is one line of output.

use anyhow::{Context, Result};
use clap::Args;
use futures::StreamExt;
use serde::Serialize;

use crate::cli::commands::{OutputOptions, StyleArg};
use crate::cli::output::progress::create_spinner;
use crate::cli::output::{render, tree, warning_line, CommandOutput, TableFormatter};
use crate::domain::models::{ClusterOutcome, OutputStyle};
use crate::services::ClusterAggregator;

#[derive(Args, Debug, Default)]
pub struct StreamArgs {
    /// Rendering style (defaults to `output.style` from configuration)
    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,
}

/// One completed cluster
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ClusterOutput {
    outcome: ClusterOutcome,
    #[serde(skip)]
    style: OutputStyle,
    #[serde(skip)]
    use_colors: bool,
}

impl ClusterOutput {
    pub fn new(outcome: ClusterOutcome, options: &OutputOptions) -> Self {
        Self {
            outcome,
            style: options.style,
            use_colors: options.use_colors,
        }
    }
}

impl CommandOutput for ClusterOutput {
    fn to_human(&self) -> String {
        let rendered = match self.style {
            OutputStyle::Table => TableFormatter::new(self.use_colors).format_cluster(&self.outcome.cluster),
            OutputStyle::Tree => tree::render_cluster(&self.outcome.cluster, self.use_colors),
        };
        rendered.trim_end().to_string()
    }
}

pub async fn execute(
    args: StreamArgs,
    aggregator: &ClusterAggregator,
    options: &OutputOptions,
) -> Result<()> {
    let options = options.with_style(args.style);

    let spinner = create_spinner("Discovering clusters", options.spinner);
    let mut stream = match aggregator.aggregate_stream().await {
        Ok(stream) => stream,
        Err(err) => {
            spinner.finish_and_clear();
            return Err(err).context("Failed to discover clusters");
        }
    };

    let expected = stream.expected();
    let mut received = 0;
    spinner.set_message(format!("{received}/{expected} clusters"));

    while let Some(outcome) = stream.next().await {
        received += 1;
        let errors = outcome.errors.clone();
        let rendered = render(&ClusterOutput::new(outcome, &options), options.json, true);

        spinner.suspend(|| {
            println!("{rendered}");
            for error in &errors {
                eprintln!("{}", warning_line(error));
            }
        });
        spinner.set_message(format!("{received}/{expected} clusters"));
    }
    spinner.finish_and_clear();

    if received < expected {
        anyhow::bail!("Aggregation cancelled after {received} of {expected} clusters");
    }
    Ok(())
}
