//! CLI command implementations.

pub mod config;
pub mod stream;
pub mod tree;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::adapters::EcsResourceClient;
use crate::domain::models::{Config, OutputStyle};
use crate::services::ClusterAggregator;

/// Presentation choices resolved from flags and configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub json: bool,
    pub use_colors: bool,
    pub style: OutputStyle,
    pub spinner: bool,
}

/// `--style` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    /// Name / Running / Pending table
    Table,
    /// Box-drawing tree
    Tree,
}

impl From<StyleArg> for OutputStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Table => Self::Table,
            StyleArg::Tree => Self::Tree,
        }
    }
}

impl OutputOptions {
    /// Override the configured style when `--style` was given
    #[must_use]
    pub fn with_style(mut self, style: Option<StyleArg>) -> Self {
        if let Some(style) = style {
            self.style = style.into();
        }
        self
    }
}

/// Build an aggregator over the ECS API that cancels on Ctrl-C
pub async fn connect(config: &Config) -> Result<ClusterAggregator> {
    let client = EcsResourceClient::from_config(&config.aws, &config.rate_limit)
        .await
        .context("Failed to configure ECS client")?;
    let aggregator = ClusterAggregator::new(Arc::new(client), &config.aggregation);
    cancel_on_interrupt(aggregator.cancellation_token());
    Ok(aggregator)
}

fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            () = token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => {
                if signal.is_ok() {
                    warn!("interrupt received, cancelling in-flight requests");
                    token.cancel();
                }
            }
        }
    });
}
