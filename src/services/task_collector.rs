//! Task collection for a single service.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::models::TaskRecord;
use crate::domain::ports::{ClientError, Operation, ResourceClient};
use crate::services::deadline::call;

/// Resolves, describes and projects the tasks of one service.
#[derive(Clone)]
pub struct TaskCollector {
    client: Arc<dyn ResourceClient>,
    request_timeout: Option<Duration>,
}

impl TaskCollector {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self {
            client,
            request_timeout: None,
        }
    }

    /// Bound every client call made by this collector
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Collect the tasks of `service_name` in `cluster_arn`.
    ///
    /// An empty task list skips the describe call. Task order follows the
    /// describe-tasks response.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn collect_tasks(
        &self,
        cluster_arn: &str,
        service_name: &str,
    ) -> Result<Vec<TaskRecord>, ClientError> {
        let task_ids = call(
            Operation::ListTasks,
            self.request_timeout,
            self.client.list_tasks(cluster_arn, service_name),
        )
        .await?;

        if task_ids.is_empty() {
            debug!("service has no tasks");
            return Ok(Vec::new());
        }

        let described = call(
            Operation::DescribeTasks,
            self.request_timeout,
            self.client.describe_tasks(cluster_arn, &task_ids),
        )
        .await?;

        debug!(
            listed = task_ids.len(),
            described = described.len(),
            "tasks collected"
        );

        Ok(described.iter().map(TaskRecord::from_summary).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{ClusterFixture, InMemoryResourceClient, ServiceFixture, TaskFixture};

    fn client() -> Arc<InMemoryResourceClient> {
        Arc::new(InMemoryResourceClient::new().with_cluster(
            ClusterFixture::new("prod", 2, 0)
                .with_service(
                    ServiceFixture::new("api", 2, 0)
                        .with_task(TaskFixture::new("api", 5, "RUNNING", "RUNNING"))
                        .with_task(TaskFixture::with_definition(
                            "arn:aws:ecs:eu-west-1:123456789012:task-definition/api",
                            "RUNNING",
                            "PENDING",
                        )),
                )
                .with_service(ServiceFixture::new("idle", 0, 0)),
        ))
    }

    #[tokio::test]
    async fn test_collects_and_projects_tasks() {
        let client = client();
        let collector = TaskCollector::new(client.clone());

        let tasks = collector
            .collect_tasks(&InMemoryResourceClient::cluster_arn("prod"), "api")
            .await
            .unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].revision, 5);
        assert_eq!(tasks[1].revision, TaskRecord::UNKNOWN_REVISION);
        assert_eq!(tasks[1].last_status, "PENDING");
        assert_eq!(client.call_count(Operation::DescribeTasks), 1);
    }

    #[tokio::test]
    async fn test_empty_service_skips_describe() {
        let client = client();
        let collector = TaskCollector::new(client.clone());

        let tasks = collector
            .collect_tasks(&InMemoryResourceClient::cluster_arn("prod"), "idle")
            .await
            .unwrap();

        assert!(tasks.is_empty());
        assert_eq!(client.call_count(Operation::ListTasks), 1);
        assert_eq!(client.call_count(Operation::DescribeTasks), 0);
    }

    #[tokio::test]
    async fn test_list_failure_is_returned() {
        let client = Arc::new(
            InMemoryResourceClient::new()
                .with_cluster(ClusterFixture::new("prod", 0, 0).with_service(ServiceFixture::new("api", 0, 0)))
                .fail_list_tasks("prod", "api", "AccessDenied"),
        );
        let collector = TaskCollector::new(client);

        let err = collector
            .collect_tasks(&InMemoryResourceClient::cluster_arn("prod"), "api")
            .await
            .unwrap_err();

        assert_eq!(err, ClientError::api(Operation::ListTasks, "AccessDenied"));
    }

    #[tokio::test]
    async fn test_describe_failure_is_returned() {
        let client = client();
        client.fail_operation(Operation::DescribeTasks, "Throttling");
        let collector = TaskCollector::new(client);

        let err = collector
            .collect_tasks(&InMemoryResourceClient::cluster_arn("prod"), "api")
            .await
            .unwrap_err();

        assert_eq!(err.operation(), Operation::DescribeTasks);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let client = client();
        client.set_latency(Duration::from_secs(10));
        let collector = TaskCollector::new(client).with_request_timeout(Some(Duration::from_secs(1)));

        let err = collector
            .collect_tasks(&InMemoryResourceClient::cluster_arn("prod"), "api")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Timeout {
                operation: Operation::ListTasks,
                ..
            }
        ));
    }
}
