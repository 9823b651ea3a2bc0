//! In-memory resource client for tests and benchmarks.
//!
//! Serves a fixed cluster → service → task fixture with optional failure
//! injection, artificial latency and per-operation call accounting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::models::{ClusterSummary, ServiceSummary, TaskSummary};
use crate::domain::ports::{ClientError, Operation, ResourceClient};

const ARN_PREFIX: &str = "arn:aws:ecs:us-east-1:000000000000";

/// A task served by the fixture
#[derive(Debug, Clone)]
pub struct TaskFixture {
    pub task_definition_arn: String,
    pub desired_status: String,
    pub last_status: String,
}

impl TaskFixture {
    pub fn new(family: &str, revision: u32, desired: &str, last: &str) -> Self {
        Self::with_definition(
            &format!("{ARN_PREFIX}:task-definition/{family}:{revision}"),
            desired,
            last,
        )
    }

    /// Task with a raw definition reference, e.g. one lacking a revision
    pub fn with_definition(definition: &str, desired: &str, last: &str) -> Self {
        Self {
            task_definition_arn: definition.to_string(),
            desired_status: desired.to_string(),
            last_status: last.to_string(),
        }
    }
}

/// A service served by the fixture
#[derive(Debug, Clone)]
pub struct ServiceFixture {
    pub name: String,
    pub running: i64,
    pub pending: i64,
    pub tasks: Vec<TaskFixture>,
}

impl ServiceFixture {
    pub fn new(name: &str, running: i64, pending: i64) -> Self {
        Self {
            name: name.to_string(),
            running,
            pending,
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_task(mut self, task: TaskFixture) -> Self {
        self.tasks.push(task);
        self
    }
}

/// A cluster served by the fixture
#[derive(Debug, Clone)]
pub struct ClusterFixture {
    pub name: String,
    pub running: i64,
    pub pending: i64,
    pub services: Vec<ServiceFixture>,
    /// Extra delay applied to every call scoped to this cluster
    pub latency: Duration,
}

impl ClusterFixture {
    pub fn new(name: &str, running: i64, pending: i64) -> Self {
        Self {
            name: name.to_string(),
            running,
            pending,
            services: Vec::new(),
            latency: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_service(mut self, service: ServiceFixture) -> Self {
        self.services.push(service);
        self
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn arn(&self) -> String {
        InMemoryResourceClient::cluster_arn(&self.name)
    }
}

#[derive(Debug, Clone)]
enum FailureScope {
    Any,
    Cluster(String),
    Service { cluster: String, service: String },
}

#[derive(Debug, Clone)]
struct FailureRule {
    operation: Operation,
    scope: FailureScope,
    message: String,
}

impl FailureRule {
    fn matches(&self, operation: Operation, cluster: Option<&str>, service: Option<&str>) -> bool {
        if self.operation != operation {
            return false;
        }
        match &self.scope {
            FailureScope::Any => true,
            FailureScope::Cluster(name) => cluster == Some(name.as_str()),
            FailureScope::Service {
                cluster: c,
                service: s,
            } => cluster == Some(c.as_str()) && service == Some(s.as_str()),
        }
    }
}

#[derive(Default)]
struct CallStats {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// Fixture-backed [`ResourceClient`]
pub struct InMemoryResourceClient {
    clusters: Vec<ClusterFixture>,
    failures: Mutex<Vec<FailureRule>>,
    latency: Mutex<Duration>,
    stats: HashMap<Operation, CallStats>,
}

impl InMemoryResourceClient {
    pub fn new() -> Self {
        Self {
            clusters: Vec::new(),
            failures: Mutex::new(Vec::new()),
            latency: Mutex::new(Duration::ZERO),
            stats: Operation::ALL
                .iter()
                .map(|op| (*op, CallStats::default()))
                .collect(),
        }
    }

    /// Identifier the fixture assigns to a cluster name
    pub fn cluster_arn(name: &str) -> String {
        format!("{ARN_PREFIX}:cluster/{name}")
    }

    #[must_use]
    pub fn with_cluster(mut self, cluster: ClusterFixture) -> Self {
        self.clusters.push(cluster);
        self
    }

    #[must_use]
    pub fn fail_list_clusters(self, message: &str) -> Self {
        self.with_failure(Operation::ListClusters, FailureScope::Any, message)
    }

    #[must_use]
    pub fn fail_describe_clusters(self, message: &str) -> Self {
        self.with_failure(Operation::DescribeClusters, FailureScope::Any, message)
    }

    #[must_use]
    pub fn fail_list_services(self, cluster: &str, message: &str) -> Self {
        self.with_failure(
            Operation::ListServices,
            FailureScope::Cluster(cluster.to_string()),
            message,
        )
    }

    #[must_use]
    pub fn fail_describe_services(self, cluster: &str, message: &str) -> Self {
        self.with_failure(
            Operation::DescribeServices,
            FailureScope::Cluster(cluster.to_string()),
            message,
        )
    }

    #[must_use]
    pub fn fail_list_tasks(self, cluster: &str, service: &str, message: &str) -> Self {
        self.with_failure(
            Operation::ListTasks,
            FailureScope::Service {
                cluster: cluster.to_string(),
                service: service.to_string(),
            },
            message,
        )
    }

    #[must_use]
    pub fn fail_describe_tasks(self, cluster: &str, service: &str, message: &str) -> Self {
        self.with_failure(
            Operation::DescribeTasks,
            FailureScope::Service {
                cluster: cluster.to_string(),
                service: service.to_string(),
            },
            message,
        )
    }

    fn with_failure(self, operation: Operation, scope: FailureScope, message: &str) -> Self {
        self.push_failure(operation, scope, message);
        self
    }

    /// Fail every call of `operation` from now on
    pub fn fail_operation(&self, operation: Operation, message: &str) {
        self.push_failure(operation, FailureScope::Any, message);
    }

    fn push_failure(&self, operation: Operation, scope: FailureScope, message: &str) {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.push(FailureRule {
            operation,
            scope,
            message: message.to_string(),
        });
    }

    /// Delay applied to every call, on top of per-cluster latency
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    /// Number of times `operation` was invoked
    pub fn call_count(&self, operation: Operation) -> usize {
        self.stats[&operation].calls.load(Ordering::SeqCst)
    }

    /// Total number of client calls
    pub fn total_calls(&self) -> usize {
        Operation::ALL.iter().map(|op| self.call_count(*op)).sum()
    }

    /// Highest number of concurrent in-flight calls of `operation`
    pub fn peak_in_flight(&self, operation: Operation) -> usize {
        self.stats[&operation].peak.load(Ordering::SeqCst)
    }

    fn find_cluster(&self, arn: &str) -> Option<&ClusterFixture> {
        self.clusters.iter().find(|c| c.arn() == arn)
    }

    fn cluster_or_error(&self, operation: Operation, arn: &str) -> Result<&ClusterFixture, ClientError> {
        self.find_cluster(arn).ok_or_else(|| {
            ClientError::api(operation, format!("ClusterNotFoundException: {arn}"))
        })
    }

    fn service_arn(cluster: &str, service: &str) -> String {
        format!("{ARN_PREFIX}:service/{cluster}/{service}")
    }

    fn task_arn(cluster: &str, service: &str, index: usize) -> String {
        format!("{ARN_PREFIX}:task/{cluster}/{service}-{index}")
    }

    fn service_for_task<'a>(cluster: &'a ClusterFixture, task_arn: &str) -> Option<&'a ServiceFixture> {
        cluster.services.iter().find(|s| {
            (0..s.tasks.len()).any(|i| Self::task_arn(&cluster.name, &s.name, i) == task_arn)
        })
    }

    /// Account for the call, apply latency and injected failures
    async fn enter(
        &self,
        operation: Operation,
        cluster: Option<&ClusterFixture>,
        service: Option<&str>,
    ) -> Result<(), ClientError> {
        let stats = &self.stats[&operation];
        stats.calls.fetch_add(1, Ordering::SeqCst);
        let current = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.peak.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&stats.in_flight);

        let base = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        let delay = base + cluster.map_or(Duration::ZERO, |c| c.latency);
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }

        let cluster_name = cluster.map(|c| c.name.as_str());
        let failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        match failures
            .iter()
            .find(|rule| rule.matches(operation, cluster_name, service))
        {
            Some(rule) => Err(ClientError::api(operation, rule.message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryResourceClient {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResourceClient for InMemoryResourceClient {
    async fn list_clusters(&self) -> Result<Vec<String>, ClientError> {
        self.enter(Operation::ListClusters, None, None).await?;
        Ok(self.clusters.iter().map(ClusterFixture::arn).collect())
    }

    async fn describe_clusters(
        &self,
        clusters: &[String],
    ) -> Result<Vec<ClusterSummary>, ClientError> {
        self.enter(Operation::DescribeClusters, None, None).await?;
        Ok(clusters
            .iter()
            .filter_map(|arn| self.find_cluster(arn))
            .map(|c| ClusterSummary {
                arn: c.arn(),
                name: c.name.clone(),
                running_tasks_count: c.running,
                pending_tasks_count: c.pending,
            })
            .collect())
    }

    async fn list_services(&self, cluster: &str) -> Result<Vec<String>, ClientError> {
        let fixture = self.cluster_or_error(Operation::ListServices, cluster)?;
        self.enter(Operation::ListServices, Some(fixture), None).await?;
        Ok(fixture
            .services
            .iter()
            .map(|s| Self::service_arn(&fixture.name, &s.name))
            .collect())
    }

    async fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> Result<Vec<ServiceSummary>, ClientError> {
        let fixture = self.cluster_or_error(Operation::DescribeServices, cluster)?;
        self.enter(Operation::DescribeServices, Some(fixture), None).await?;
        Ok(services
            .iter()
            .filter_map(|arn| {
                fixture
                    .services
                    .iter()
                    .find(|s| Self::service_arn(&fixture.name, &s.name) == *arn)
            })
            .map(|s| ServiceSummary {
                name: s.name.clone(),
                running_count: s.running,
                pending_count: s.pending,
            })
            .collect())
    }

    async fn list_tasks(&self, cluster: &str, service: &str) -> Result<Vec<String>, ClientError> {
        let fixture = self.cluster_or_error(Operation::ListTasks, cluster)?;
        self.enter(Operation::ListTasks, Some(fixture), Some(service)).await?;
        let Some(found) = fixture.services.iter().find(|s| s.name == service) else {
            return Err(ClientError::api(
                Operation::ListTasks,
                format!("ServiceNotFoundException: {service}"),
            ));
        };
        Ok((0..found.tasks.len())
            .map(|i| Self::task_arn(&fixture.name, &found.name, i))
            .collect())
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[String],
    ) -> Result<Vec<TaskSummary>, ClientError> {
        let fixture = self.cluster_or_error(Operation::DescribeTasks, cluster)?;
        let owner = tasks
            .first()
            .and_then(|arn| Self::service_for_task(fixture, arn))
            .map(|s| s.name.as_str());
        self.enter(Operation::DescribeTasks, Some(fixture), owner).await?;

        let mut described = Vec::with_capacity(tasks.len());
        for arn in tasks {
            let Some(service) = Self::service_for_task(fixture, arn) else {
                continue;
            };
            for (i, task) in service.tasks.iter().enumerate() {
                if Self::task_arn(&fixture.name, &service.name, i) == *arn {
                    described.push(TaskSummary {
                        task_arn: arn.clone(),
                        task_definition_arn: task.task_definition_arn.clone(),
                        desired_status: task.desired_status.clone(),
                        last_status: task.last_status.clone(),
                    });
                }
            }
        }
        Ok(described)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> InMemoryResourceClient {
        InMemoryResourceClient::new().with_cluster(
            ClusterFixture::new("prod", 1, 0).with_service(
                ServiceFixture::new("api", 1, 0)
                    .with_task(TaskFixture::new("api", 5, "RUNNING", "RUNNING")),
            ),
        )
    }

    #[tokio::test]
    async fn test_serves_fixture_hierarchy() {
        let client = fixture();
        let arns = client.list_clusters().await.unwrap();
        assert_eq!(arns, vec![InMemoryResourceClient::cluster_arn("prod")]);

        let clusters = client.describe_clusters(&arns).await.unwrap();
        assert_eq!(clusters[0].name, "prod");

        let services = client.list_services(&arns[0]).await.unwrap();
        let described = client.describe_services(&arns[0], &services).await.unwrap();
        assert_eq!(described[0].name, "api");

        let tasks = client.list_tasks(&arns[0], "api").await.unwrap();
        let described = client.describe_tasks(&arns[0], &tasks).await.unwrap();
        assert_eq!(described.len(), 1);
        assert!(described[0].task_definition_arn.ends_with("task-definition/api:5"));
        assert_eq!(client.total_calls(), 6);
    }

    #[tokio::test]
    async fn test_scoped_failure_only_hits_matching_cluster() {
        let client = fixture()
            .with_cluster(ClusterFixture::new("stage", 0, 0))
            .fail_list_services("stage", "AccessDenied");

        assert!(client
            .list_services(&InMemoryResourceClient::cluster_arn("prod"))
            .await
            .is_ok());
        let err = client
            .list_services(&InMemoryResourceClient::cluster_arn("stage"))
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::api(Operation::ListServices, "AccessDenied"));
    }

    #[tokio::test]
    async fn test_unknown_cluster_is_an_error() {
        let client = fixture();
        let err = client.list_services("arn:missing").await.unwrap_err();
        assert_eq!(err.operation(), Operation::ListServices);
    }
}
