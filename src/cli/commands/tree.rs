//! Implementation of the `ecsview tree` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::commands::{OutputOptions, StyleArg};
use crate::cli::output::progress::create_spinner;
use crate::cli::output::{output, tree, warning_line, CommandOutput, TableFormatter};
use crate::domain::models::{Aggregation, OutputStyle};
use crate::services::ClusterAggregator;

#[derive(Args, Debug, Default)]
pub struct TreeArgs {
    /// Rendering style (defaults to `output.style` from configuration)
    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,
}

/// A finished aggregation ready to print
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct TreeOutput {
    aggregation: Aggregation,
    #[serde(skip)]
    style: OutputStyle,
    #[serde(skip)]
    use_colors: bool,
}

impl TreeOutput {
    pub fn new(aggregation: Aggregation, options: &OutputOptions) -> Self {
        Self {
            aggregation,
            style: options.style,
            use_colors: options.use_colors,
        }
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }
}

impl CommandOutput for TreeOutput {
    fn to_human(&self) -> String {
        match self.style {
            OutputStyle::Table => {
                TableFormatter::new(self.use_colors).format_clusters(&self.aggregation.clusters)
            }
            OutputStyle::Tree => tree::render_clusters(&self.aggregation.clusters, self.use_colors),
        }
    }
}

pub async fn execute(
    args: TreeArgs,
    aggregator: &ClusterAggregator,
    options: &OutputOptions,
) -> Result<()> {
    let options = options.with_style(args.style);

    let spinner = create_spinner("Fetching clusters, services and tasks", options.spinner);
    let result = aggregator.aggregate().await;
    spinner.finish_and_clear();

    let aggregation = result.context("Failed to aggregate clusters")?;
    let result = TreeOutput::new(aggregation, &options);
    output(&result, options.json);

    for error in &result.aggregation().errors {
        eprintln!("{}", warning_line(error));
    }

    Ok(())
}
