//! Cluster aggregation: the root of the concurrent fetch-and-aggregate engine.
//!
//! Discovery (list + describe clusters) is sequential and fatal on failure.
//! Every described cluster then becomes one unit of work on a `JoinSet`,
//! bounded by a semaphore, which collects the cluster's services and tasks
//! and hands the finished subtree to a channel. The materialized
//! [`ClusterAggregator::aggregate`] drains that channel and restores describe
//! order; [`ClusterAggregator::aggregate_stream`] exposes it directly.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::{FutureExt, Stream};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::errors::{CollectionError, DomainError, DomainResult};
use crate::domain::models::{
    AggregationConfig, Aggregation, ClusterOutcome, ClusterRecord, ClusterSummary, ResourcePath,
    ScopedError,
};
use crate::domain::ports::{Operation, ResourceClient};
use crate::services::deadline::call;
use crate::services::service_collector::ServiceCollector;

/// Builds the full cluster → service → task tree.
pub struct ClusterAggregator {
    client: Arc<dyn ResourceClient>,
    services: ServiceCollector,
    max_concurrent_clusters: usize,
    stream_buffer: usize,
    request_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl ClusterAggregator {
    pub fn new(client: Arc<dyn ResourceClient>, config: &AggregationConfig) -> Self {
        let request_timeout = config.request_timeout();
        Self {
            services: ServiceCollector::new(client.clone(), config.max_concurrent_services)
                .with_request_timeout(request_timeout),
            client,
            max_concurrent_clusters: config.max_concurrent_clusters.max(1),
            stream_buffer: config.stream_buffer.max(1),
            request_timeout,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort in-flight work when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts every aggregation started by this aggregator
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abort all in-flight fetches
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run a full aggregation and return the materialized tree.
    ///
    /// Fails only when cluster discovery fails or the aggregation is
    /// cancelled; failures below the cluster level are returned in
    /// [`Aggregation::errors`].
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn aggregate(&self) -> DomainResult<Aggregation> {
        let fetched_at = Utc::now();
        let started = Instant::now();

        let mut stream = self.aggregate_stream().await?;
        let expected = stream.expected();
        let mut outcomes = Vec::with_capacity(expected);
        while let Some(outcome) = stream.next_outcome().await {
            outcomes.push(outcome);
        }

        if outcomes.len() < expected && self.cancel.is_cancelled() {
            warn!(
                completed = outcomes.len(),
                expected, "aggregation cancelled before all clusters finished"
            );
            return Err(DomainError::Cancelled);
        }

        let aggregation = Aggregation::from_outcomes(outcomes, fetched_at);
        info!(
            clusters = aggregation.clusters.len(),
            scoped_errors = aggregation.errors.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "aggregation complete"
        );
        Ok(aggregation)
    }

    /// Discover clusters, then stream each cluster as soon as its subtree
    /// is complete.
    ///
    /// Discovery failures are returned before any cluster is emitted.
    /// Emission order is completion order. Dropping the stream cancels the
    /// remaining work.
    pub async fn aggregate_stream(&self) -> DomainResult<ClusterStream> {
        let summaries = self.discover().await?;
        let expected = summaries.len();

        let (tx, rx) = mpsc::channel(self.stream_buffer);
        let token = self.cancel.child_token();

        tokio::spawn(supervise(
            self.services.clone(),
            summaries,
            tx,
            token.clone(),
            self.max_concurrent_clusters,
        ));

        Ok(ClusterStream {
            rx,
            cancel: token,
            expected,
        })
    }

    async fn discover(&self) -> DomainResult<Vec<ClusterSummary>> {
        let cluster_ids = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(DomainError::Cancelled),
            listed = call(Operation::ListClusters, self.request_timeout, self.client.list_clusters()) => {
                listed.map_err(DomainError::ClusterDiscovery)?
            }
        };

        if cluster_ids.is_empty() {
            info!("no clusters found");
            return Ok(Vec::new());
        }

        let summaries = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(DomainError::Cancelled),
            described = call(
                Operation::DescribeClusters,
                self.request_timeout,
                self.client.describe_clusters(&cluster_ids),
            ) => described.map_err(DomainError::ClusterDescription)?
        };

        debug!(
            listed = cluster_ids.len(),
            described = summaries.len(),
            "clusters discovered"
        );
        Ok(summaries)
    }
}

/// Finite, non-restartable stream of completed cluster subtrees.
///
/// Ends once every cluster has been emitted and all producers have
/// finished, or early if the aggregation is cancelled.
pub struct ClusterStream {
    rx: mpsc::Receiver<ClusterOutcome>,
    cancel: CancellationToken,
    expected: usize,
}

impl ClusterStream {
    /// Number of clusters discovery returned
    pub const fn expected(&self) -> usize {
        self.expected
    }

    /// Wait for the next completed cluster
    pub async fn next_outcome(&mut self) -> Option<ClusterOutcome> {
        self.rx.recv().await
    }

    /// Stop the remaining cluster units
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Stream for ClusterStream {
    type Item = ClusterOutcome;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for ClusterStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn one unit per cluster and wait for all of them.
///
/// Each unit owns a sender clone; the channel closes when the last unit
/// finishes.
async fn supervise(
    services: ServiceCollector,
    summaries: Vec<ClusterSummary>,
    tx: mpsc::Sender<ClusterOutcome>,
    cancel: CancellationToken,
    max_concurrent_clusters: usize,
) {
    let semaphore = Arc::new(Semaphore::new(max_concurrent_clusters));
    let mut units = JoinSet::new();

    for (position, summary) in summaries.into_iter().enumerate() {
        let services = services.clone();
        let semaphore = semaphore.clone();
        let tx = tx.clone();
        let cancel = cancel.clone();

        units.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(cluster = %summary.name, "cluster unit cancelled");
                }
                () = run_cluster_unit(&services, &summary, position, &semaphore, &tx) => {}
            }
        });
    }
    drop(tx);

    while let Some(joined) = units.join_next().await {
        if let Err(err) = joined {
            error!(error = %err, "cluster unit terminated abnormally");
        }
    }
}

async fn run_cluster_unit(
    services: &ServiceCollector,
    summary: &ClusterSummary,
    position: usize,
    semaphore: &Semaphore,
    tx: &mpsc::Sender<ClusterOutcome>,
) {
    // The semaphore is never closed.
    let Ok(_permit) = semaphore.acquire().await else {
        return;
    };

    let outcome = collect_cluster(services, summary, position).await;
    if tx.send(outcome).await.is_err() {
        debug!(cluster = %summary.name, "stream consumer went away");
    }
}

/// Populate one cluster shell. Never fails: errors become scoped entries.
async fn collect_cluster(
    services: &ServiceCollector,
    summary: &ClusterSummary,
    position: usize,
) -> ClusterOutcome {
    let shell = ClusterRecord::from_summary(summary);
    let path = ResourcePath::cluster(&shell.name);

    let result = AssertUnwindSafe(services.collect_services(&shell))
        .catch_unwind()
        .await;

    match result {
        Ok(Ok(collected)) => ClusterOutcome {
            cluster: shell.with_services(collected.items),
            errors: collected.errors,
            position,
        },
        Ok(Err(err)) => {
            warn!(
                cluster = %shell.name,
                error = %err,
                "service collection failed, leaving cluster empty"
            );
            ClusterOutcome {
                cluster: shell,
                errors: vec![ScopedError::new(path, err)],
                position,
            }
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(cluster = %shell.name, panic = %message, "service collection panicked");
            ClusterOutcome {
                cluster: shell,
                errors: vec![ScopedError::new(path, CollectionError::Panicked(message))],
                position,
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
