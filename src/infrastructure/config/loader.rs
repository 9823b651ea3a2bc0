use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project configuration file, looked up from the working directory
pub const CONFIG_FILE: &str = "ecsview.yaml";
/// Optional local overrides layered on top of [`CONFIG_FILE`]
pub const LOCAL_CONFIG_FILE: &str = "ecsview.local.yaml";
/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "ECSVIEW_";

/// Accepted `requests_per_second` range, bounded so the limiter period is representable
const REQUESTS_PER_SECOND_RANGE: std::ops::RangeInclusive<f64> = 0.001..=1_000_000.0;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid max_concurrent_clusters: {0}. Must be at least 1")]
    InvalidClusterConcurrency(usize),

    #[error("Invalid max_concurrent_services: {0}. Must be at least 1")]
    InvalidServiceConcurrency(usize),

    #[error("Invalid stream_buffer: {0}. Must be at least 1")]
    InvalidStreamBuffer(usize),

    #[error("Invalid rate limit: {0}. Must be between 0.001 and 1000000")]
    InvalidRateLimit(f64),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `ecsview.yaml`
    /// 3. `ecsview.local.yaml`
    /// 4. Environment variables (`ECSVIEW_*`, `__` separates sections)
    pub fn load() -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(CONFIG_FILE))
            .merge(Yaml::file(LOCAL_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::extract(&figment).context("Failed to extract configuration from figment")
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::extract(&figment)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn extract(figment: &Figment) -> Result<Config> {
        let config: Config = figment.extract()?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let aggregation = &config.aggregation;
        if aggregation.max_concurrent_clusters == 0 {
            return Err(ConfigError::InvalidClusterConcurrency(
                aggregation.max_concurrent_clusters,
            ));
        }
        if aggregation.max_concurrent_services == 0 {
            return Err(ConfigError::InvalidServiceConcurrency(
                aggregation.max_concurrent_services,
            ));
        }
        if aggregation.stream_buffer == 0 {
            return Err(ConfigError::InvalidStreamBuffer(aggregation.stream_buffer));
        }

        let rate = config.rate_limit.requests_per_second;
        if !REQUESTS_PER_SECOND_RANGE.contains(&rate) {
            return Err(ConfigError::InvalidRateLimit(rate));
        }
        if config.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(config.rate_limit.burst_size));
        }

        if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{LogFormat, OutputStyle, RotationPolicy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.aggregation.max_concurrent_clusters, 8);
        assert_eq!(config.aggregation.max_concurrent_services, 16);
        assert_eq!(config.aggregation.request_timeout_secs, 30);
        assert!((config.rate_limit.requests_per_second - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.output.style, OutputStyle::Table);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
aggregation:
  max_concurrent_clusters: 2
  request_timeout_secs: 0
rate_limit:
  requests_per_second: 5.5
  burst_size: 10
aws:
  region: eu-west-1
  endpoint_url: http://localhost:4566
logging:
  level: debug
  format: json
  log_dir: /var/log/ecsview
  rotation: daily
output:
  style: tree
  color: never
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.aggregation.max_concurrent_clusters, 2);
        assert_eq!(config.aggregation.max_concurrent_services, 16);
        assert_eq!(config.aggregation.request_timeout(), None);
        assert_eq!(config.rate_limit.burst_size, 10);
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.rotation, RotationPolicy::Daily);
        assert_eq!(config.output.style, OutputStyle::Tree);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_cluster_concurrency() {
        let mut config = Config::default();
        config.aggregation.max_concurrent_clusters = 0;

        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidClusterConcurrency(0))
        );
    }

    #[test]
    fn test_validate_zero_service_concurrency() {
        let mut config = Config::default();
        config.aggregation.max_concurrent_services = 0;

        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidServiceConcurrency(0))
        );
    }

    #[test]
    fn test_validate_zero_stream_buffer() {
        let mut config = Config::default();
        config.aggregation.stream_buffer = 0;

        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidStreamBuffer(0))
        );
    }

    #[test]
    fn test_validate_out_of_range_rate_limit() {
        for rate in [0.0, -5.0, f64::NAN, 1e-30, f64::INFINITY, 1e12] {
            let mut config = Config::default();
            config.rate_limit.requests_per_second = rate;

            assert!(matches!(
                ConfigLoader::validate(&config),
                Err(ConfigError::InvalidRateLimit(_))
            ));
        }
    }

    #[test]
    fn test_validate_accepts_rate_limit_bounds() {
        for rate in [0.001, 0.5, 1_000_000.0] {
            let mut config = Config::default();
            config.rate_limit.requests_per_second = rate;

            assert_eq!(ConfigLoader::validate(&config), Ok(()));
        }
    }

    #[test]
    fn test_validate_zero_burst_size() {
        let mut config = Config::default();
        config.rate_limit.burst_size = 0;

        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBurstSize(0))
        );
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let file = yaml_file("aggregation:\n  max_concurrent_clusters: 3\nlogging:\n  level: info\n");

        let config = temp_env::with_vars_unset(
            [
                "ECSVIEW_AGGREGATION__MAX_CONCURRENT_CLUSTERS",
                "ECSVIEW_LOGGING__LEVEL",
            ],
            || ConfigLoader::load_from_file(file.path()),
        )
        .unwrap();

        assert_eq!(config.aggregation.max_concurrent_clusters, 3);
        assert_eq!(config.aggregation.max_concurrent_services, 16);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides_file() {
        let file = yaml_file("aggregation:\n  max_concurrent_clusters: 3\n");

        let config = temp_env::with_vars(
            [
                ("ECSVIEW_AGGREGATION__MAX_CONCURRENT_CLUSTERS", Some("5")),
                ("ECSVIEW_AWS__REGION", Some("ap-southeast-2")),
            ],
            || ConfigLoader::load_from_file(file.path()),
        )
        .unwrap();

        assert_eq!(config.aggregation.max_concurrent_clusters, 5);
        assert_eq!(config.aws.region.as_deref(), Some("ap-southeast-2"));
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let file = yaml_file("aggregation:\n  stream_buffer: 0\n");

        let err = temp_env::with_var_unset("ECSVIEW_AGGREGATION__STREAM_BUFFER", || {
            ConfigLoader::load_from_file(file.path())
        })
        .unwrap_err();

        assert!(matches!(
            err.root_cause().downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidStreamBuffer(0))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::load_from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_hierarchical_merging() {
        let base = yaml_file("aggregation:\n  max_concurrent_clusters: 5\nlogging:\n  level: info\n  format: json\n");
        let local = yaml_file("aggregation:\n  max_concurrent_clusters: 15\nlogging:\n  level: debug\n");

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base.path()))
            .merge(Yaml::file(local.path()))
            .extract()
            .unwrap();

        assert_eq!(config.aggregation.max_concurrent_clusters, 15, "Override should win");
        assert_eq!(config.logging.level, "debug", "Override should win for nested fields");
        assert_eq!(
            config.logging.format,
            LogFormat::Json,
            "Base value should persist when not overridden"
        );
    }
}
