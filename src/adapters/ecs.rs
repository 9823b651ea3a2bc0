//! AWS ECS implementation of the resource client.
//!
//! Credentials and region come from the SDK default provider chain, with
//! optional region/endpoint overrides. Every request first waits on a
//! token-bucket rate limiter shared by all callers.

use std::error::Error as StdError;
use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{Cluster, Failure, Service, Task};
use aws_sdk_ecs::Client;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use crate::domain::models::{
    AwsConfig, ClusterSummary, RateLimitConfig, ServiceSummary, TaskSummary,
};
use crate::domain::ports::{ClientError, Operation, ResourceClient};

/// Maximum identifiers accepted by a single DescribeClusters call
const DESCRIBE_CLUSTERS_LIMIT: usize = 100;
/// Maximum identifiers accepted by a single DescribeServices call
const DESCRIBE_SERVICES_LIMIT: usize = 10;
/// Maximum identifiers accepted by a single DescribeTasks call
const DESCRIBE_TASKS_LIMIT: usize = 100;

/// [`ResourceClient`] backed by the ECS API
pub struct EcsResourceClient {
    client: Client,
    limiter: DefaultDirectRateLimiter,
}

impl EcsResourceClient {
    /// Build a client from the SDK default chain plus overrides
    pub async fn from_config(aws: &AwsConfig, rate_limit: &RateLimitConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &aws.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &aws.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        debug!(
            region = ?sdk_config.region(),
            endpoint = ?aws.endpoint_url,
            "ecs client configured"
        );

        Self::new(Client::new(&sdk_config), rate_limit)
    }

    /// Wrap an existing SDK client
    pub fn new(client: Client, rate_limit: &RateLimitConfig) -> Result<Self> {
        Ok(Self {
            client,
            limiter: build_limiter(rate_limit)?,
        })
    }

    async fn throttle(&self) {
        self.limiter.until_ready().await;
    }
}

fn build_limiter(rate_limit: &RateLimitConfig) -> Result<DefaultDirectRateLimiter> {
    let period = Duration::try_from_secs_f64(1.0 / rate_limit.requests_per_second)
        .context("requests_per_second does not yield a valid replenish period")?;
    let burst = NonZeroU32::new(rate_limit.burst_size).context("burst_size must be at least 1")?;
    let quota = Quota::with_period(period)
        .context("requests_per_second is too high to express as a replenish period")?
        .allow_burst(burst);
    Ok(RateLimiter::direct(quota))
}

fn api_error(operation: Operation, err: impl StdError) -> ClientError {
    ClientError::api(operation, DisplayErrorContext(err).to_string())
}

fn log_failures(operation: Operation, failures: &[Failure]) {
    for failure in failures {
        warn!(
            %operation,
            arn = failure.arn().unwrap_or_default(),
            reason = failure.reason().unwrap_or_default(),
            "control plane reported a describe failure"
        );
    }
}

fn cluster_summary(cluster: &Cluster) -> ClusterSummary {
    ClusterSummary {
        arn: cluster.cluster_arn().unwrap_or_default().to_string(),
        name: cluster.cluster_name().unwrap_or_default().to_string(),
        running_tasks_count: i64::from(cluster.running_tasks_count()),
        pending_tasks_count: i64::from(cluster.pending_tasks_count()),
    }
}

fn service_summary(service: &Service) -> ServiceSummary {
    ServiceSummary {
        name: service.service_name().unwrap_or_default().to_string(),
        running_count: i64::from(service.running_count()),
        pending_count: i64::from(service.pending_count()),
    }
}

fn task_summary(task: &Task) -> TaskSummary {
    TaskSummary {
        task_arn: task.task_arn().unwrap_or_default().to_string(),
        task_definition_arn: task.task_definition_arn().unwrap_or_default().to_string(),
        desired_status: task.desired_status().unwrap_or_default().to_string(),
        last_status: task.last_status().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl ResourceClient for EcsResourceClient {
    async fn list_clusters(&self) -> Result<Vec<String>, ClientError> {
        self.throttle().await;
        let output = self
            .client
            .list_clusters()
            .send()
            .await
            .map_err(|e| api_error(Operation::ListClusters, e))?;
        Ok(output.cluster_arns().to_vec())
    }

    async fn describe_clusters(
        &self,
        clusters: &[String],
    ) -> Result<Vec<ClusterSummary>, ClientError> {
        let mut summaries = Vec::with_capacity(clusters.len());
        for chunk in clusters.chunks(DESCRIBE_CLUSTERS_LIMIT) {
            self.throttle().await;
            let output = self
                .client
                .describe_clusters()
                .set_clusters(Some(chunk.to_vec()))
                .send()
                .await
                .map_err(|e| api_error(Operation::DescribeClusters, e))?;
            log_failures(Operation::DescribeClusters, output.failures());
            summaries.extend(output.clusters().iter().map(cluster_summary));
        }
        Ok(summaries)
    }

    async fn list_services(&self, cluster: &str) -> Result<Vec<String>, ClientError> {
        self.throttle().await;
        let output = self
            .client
            .list_services()
            .cluster(cluster)
            .send()
            .await
            .map_err(|e| api_error(Operation::ListServices, e))?;
        Ok(output.service_arns().to_vec())
    }

    async fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> Result<Vec<ServiceSummary>, ClientError> {
        let mut summaries = Vec::with_capacity(services.len());
        for chunk in services.chunks(DESCRIBE_SERVICES_LIMIT) {
            self.throttle().await;
            let output = self
                .client
                .describe_services()
                .cluster(cluster)
                .set_services(Some(chunk.to_vec()))
                .send()
                .await
                .map_err(|e| api_error(Operation::DescribeServices, e))?;
            log_failures(Operation::DescribeServices, output.failures());
            summaries.extend(output.services().iter().map(service_summary));
        }
        Ok(summaries)
    }

    async fn list_tasks(&self, cluster: &str, service: &str) -> Result<Vec<String>, ClientError> {
        self.throttle().await;
        let output = self
            .client
            .list_tasks()
            .cluster(cluster)
            .service_name(service)
            .send()
            .await
            .map_err(|e| api_error(Operation::ListTasks, e))?;
        Ok(output.task_arns().to_vec())
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[String],
    ) -> Result<Vec<TaskSummary>, ClientError> {
        let mut summaries = Vec::with_capacity(tasks.len());
        for chunk in tasks.chunks(DESCRIBE_TASKS_LIMIT) {
            self.throttle().await;
            let output = self
                .client
                .describe_tasks()
                .cluster(cluster)
                .set_tasks(Some(chunk.to_vec()))
                .send()
                .await
                .map_err(|e| api_error(Operation::DescribeTasks, e))?;
            log_failures(Operation::DescribeTasks, output.failures());
            summaries.extend(output.tasks().iter().map(task_summary));
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries_default_missing_fields() {
        let cluster = Cluster::builder()
            .cluster_arn("arn:aws:ecs:eu-west-1:123:cluster/prod")
            .cluster_name("prod")
            .running_tasks_count(3)
            .pending_tasks_count(1)
            .build();
        let summary = cluster_summary(&cluster);
        assert_eq!(summary.name, "prod");
        assert_eq!(summary.running_tasks_count, 3);
        assert_eq!(summary.pending_tasks_count, 1);

        let task = Task::builder()
            .task_definition_arn("arn:aws:ecs:eu-west-1:123:task-definition/api:7")
            .desired_status("RUNNING")
            .build();
        let summary = task_summary(&task);
        assert_eq!(summary.last_status, "");
        assert!(summary.task_arn.is_empty());
    }

    #[test]
    fn test_limiter_rejects_zero_burst() {
        let rate = RateLimitConfig {
            requests_per_second: 10.0,
            burst_size: 0,
        };
        assert!(build_limiter(&rate).is_err());
        assert!(build_limiter(&RateLimitConfig::default()).is_ok());
    }

    #[test]
    fn test_limiter_rejects_unrepresentable_rates() {
        for requests_per_second in [1e-30, 0.0, -1.0, f64::NAN] {
            let rate = RateLimitConfig {
                requests_per_second,
                burst_size: 1,
            };
            assert!(build_limiter(&rate).is_err(), "rate {requests_per_second}");
        }
    }

    #[test]
    fn test_limiter_allows_burst_immediately() {
        let limiter = build_limiter(&RateLimitConfig {
            requests_per_second: 1.0,
            burst_size: 3,
        })
        .unwrap();
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
