pub mod cluster;
pub mod config;
pub mod report;
pub mod service;
pub mod summary;
pub mod task;

pub use cluster::ClusterRecord;
pub use config::{
    AggregationConfig, AwsConfig, ColorChoice, Config, LogFormat, LoggingConfig, OutputConfig,
    OutputStyle, RateLimitConfig, RotationPolicy,
};
pub use report::{Aggregation, ClusterOutcome, Collected, ResourcePath, ScopedError};
pub use service::ServiceRecord;
pub use summary::{ClusterSummary, ServiceSummary, TaskSummary};
pub use task::{parse_revision, try_parse_revision, TaskRecord};
