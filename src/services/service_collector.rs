//! Service collection for a single cluster.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::domain::models::{
    ClusterRecord, Collected, ResourcePath, ScopedError, ServiceRecord, ServiceSummary,
};
use crate::domain::ports::{ClientError, Operation, ResourceClient};
use crate::services::deadline::call;
use crate::services::task_collector::TaskCollector;

/// Resolves the services of one cluster and populates each with its tasks.
///
/// Task collections of sibling services run concurrently, up to
/// `max_concurrent_services` at a time, and are joined before returning.
#[derive(Clone)]
pub struct ServiceCollector {
    client: Arc<dyn ResourceClient>,
    tasks: TaskCollector,
    max_concurrent_services: usize,
    request_timeout: Option<Duration>,
}

impl ServiceCollector {
    pub fn new(client: Arc<dyn ResourceClient>, max_concurrent_services: usize) -> Self {
        Self {
            tasks: TaskCollector::new(client.clone()),
            client,
            max_concurrent_services: max_concurrent_services.max(1),
            request_timeout: None,
        }
    }

    /// Bound every client call made by this collector and its task collector
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.tasks = self.tasks.with_request_timeout(request_timeout);
        self.request_timeout = request_timeout;
        self
    }

    /// Collect the services of `cluster` with their tasks attached.
    ///
    /// A failed list or describe call is returned as `Err` and leaves the
    /// whole cluster empty. A failed task collection only empties that one
    /// service and is reported in [`Collected::errors`]. Service order
    /// follows the describe-services response.
    #[tracing::instrument(level = "debug", skip_all, fields(cluster = %cluster.name))]
    pub async fn collect_services(
        &self,
        cluster: &ClusterRecord,
    ) -> Result<Collected<ServiceRecord>, ClientError> {
        let service_ids = call(
            Operation::ListServices,
            self.request_timeout,
            self.client.list_services(&cluster.arn),
        )
        .await?;

        if service_ids.is_empty() {
            debug!("cluster has no services");
            return Ok(Collected::empty());
        }

        let described = call(
            Operation::DescribeServices,
            self.request_timeout,
            self.client.describe_services(&cluster.arn, &service_ids),
        )
        .await?;

        // `buffered` keeps one slot per position, so results come back in
        // describe order regardless of completion order.
        let pending: Vec<_> = described
            .iter()
            .map(|summary| self.populate(cluster, summary))
            .collect();
        let slots: Vec<(ServiceRecord, Option<ScopedError>)> = stream::iter(pending)
            .buffered(self.max_concurrent_services)
            .collect()
            .await;

        let mut collected = Collected::empty();
        for (service, error) in slots {
            collected.items.push(service);
            collected.errors.extend(error);
        }

        debug!(
            listed = service_ids.len(),
            described = collected.items.len(),
            failed = collected.errors.len(),
            "services collected"
        );

        Ok(collected)
    }

    async fn populate(
        &self,
        cluster: &ClusterRecord,
        summary: &ServiceSummary,
    ) -> (ServiceRecord, Option<ScopedError>) {
        let shell = ServiceRecord::from_summary(&cluster.arn, summary);

        match self.tasks.collect_tasks(&cluster.arn, &shell.name).await {
            Ok(tasks) => (shell.with_tasks(tasks), None),
            Err(err) => {
                warn!(
                    cluster = %cluster.name,
                    service = %shell.name,
                    error = %err,
                    "task collection failed, leaving service empty"
                );
                let scoped = ScopedError::new(ResourcePath::service(&cluster.name, &shell.name), err);
                (shell, Some(scoped))
            }
        }
    }
}
