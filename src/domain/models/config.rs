use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration structure for ecsview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Fan-out limits and call deadlines
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Client-side rate limiting toward the control plane
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// AWS client settings
    #[serde(default)]
    pub aws: AwsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Presentation settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Aggregation engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AggregationConfig {
    /// Cluster subtrees fetched at the same time
    #[serde(default = "default_max_concurrent_clusters")]
    pub max_concurrent_clusters: usize,

    /// Task collections in flight per cluster
    #[serde(default = "default_max_concurrent_services")]
    pub max_concurrent_services: usize,

    /// Deadline for a single client call in seconds (0 disables)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Completed clusters buffered ahead of a slow stream consumer
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
}

const fn default_max_concurrent_clusters() -> usize {
    8
}

const fn default_max_concurrent_services() -> usize {
    16
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_stream_buffer() -> usize {
    16
}

impl AggregationConfig {
    /// Per-call deadline, if enabled
    pub const fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_clusters: default_max_concurrent_clusters(),
            max_concurrent_services: default_max_concurrent_services(),
            request_timeout_secs: default_request_timeout_secs(),
            stream_buffer: default_stream_buffer(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst size for token bucket
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

const fn default_requests_per_second() -> f64 {
    20.0
}

const fn default_burst_size() -> u32 {
    40
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// AWS client settings. Credentials always come from the SDK default chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AwsConfig {
    /// Region override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Endpoint override, e.g. a local emulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format for stderr output
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for JSON log files (stderr only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Rotation policy for file output
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    #[default]
    Compact,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    Daily,
    Hourly,
    #[default]
    Never,
}

/// Presentation settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OutputConfig {
    #[serde(default)]
    pub style: OutputStyle,

    #[serde(default)]
    pub color: ColorChoice,
}

/// How the cluster tree is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Name / Running / Pending table
    #[default]
    Table,
    /// Box-drawing tree
    Tree,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}
