//! ecsview - concurrent ECS cluster inspector
//!
//! ecsview walks the ECS control plane from clusters to services to tasks,
//! fanning out the per-cluster and per-service fetches concurrently, and
//! returns one consistent tree together with the failures of any branch
//! that could not be populated.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): records, configuration, errors and the
//!   `ResourceClient` port
//! - **Service Layer** (`services`): task, service and cluster collectors
//! - **Adapters** (`adapters`): ECS and in-memory `ResourceClient`s
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ecsview::adapters::EcsResourceClient;
//! use ecsview::{ClusterAggregator, ConfigLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let client = EcsResourceClient::from_config(&config.aws, &config.rate_limit).await?;
//!     let aggregator = ClusterAggregator::new(Arc::new(client), &config.aggregation);
//!
//!     let aggregation = aggregator.aggregate().await?;
//!     for cluster in &aggregation.clusters {
//!         println!("{}: {} services", cluster.name, cluster.services.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Aggregation, AggregationConfig, ClusterOutcome, ClusterRecord, Config, ResourcePath,
    ScopedError, ServiceRecord, TaskRecord,
};
pub use domain::ports::{ClientError, Operation, ResourceClient};
pub use domain::{CollectionError, DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ClusterAggregator, ClusterStream, ServiceCollector, TaskCollector};
