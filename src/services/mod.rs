//! Fetch-and-aggregate services.
//!
//! Leaves first: [`TaskCollector`] → [`ServiceCollector`] →
//! [`ClusterAggregator`]. Every collector receives the shared
//! [`ResourceClient`](crate::domain::ports::ResourceClient) explicitly.

pub mod cluster_aggregator;
mod deadline;
pub mod service_collector;
pub mod task_collector;

pub use cluster_aggregator::{ClusterAggregator, ClusterStream};
pub use service_collector::ServiceCollector;
pub use task_collector::TaskCollector;
