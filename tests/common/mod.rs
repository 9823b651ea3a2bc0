//! Common test utilities for integration tests
//!
//! Fixture builders over the in-memory resource client plus helpers for
//! comparing aggregation results.

use std::collections::BTreeSet;
use std::sync::Arc;

use ecsview::adapters::memory::{ClusterFixture, InMemoryResourceClient, ServiceFixture, TaskFixture};
use ecsview::{Aggregation, AggregationConfig, ClusterAggregator, ClusterRecord};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// `prod` with one service `api` running revisions 5 and 6, and an empty `stage`
#[allow(dead_code)]
pub fn scenario_client() -> InMemoryResourceClient {
    InMemoryResourceClient::new()
        .with_cluster(
            ClusterFixture::new("prod", 1, 0).with_service(
                ServiceFixture::new("api", 2, 0)
                    .with_task(TaskFixture::new("api", 5, "RUNNING", "RUNNING"))
                    .with_task(TaskFixture::new("api", 6, "RUNNING", "PENDING")),
            ),
        )
        .with_cluster(ClusterFixture::new("stage", 0, 0))
}

/// `clusters` × `services` × `tasks` grid with deterministic names
#[allow(dead_code)]
pub fn grid_client(clusters: usize, services: usize, tasks: usize) -> InMemoryResourceClient {
    (0..clusters).fold(InMemoryResourceClient::new(), |client, c| {
        let cluster = (0..services).fold(
            ClusterFixture::new(&format!("cluster-{c}"), 0, 0),
            |cluster, s| {
                let service = (0..tasks).fold(
                    ServiceFixture::new(&format!("svc-{c}-{s}"), 0, 0),
                    |service, t| {
                        let revision = u32::try_from(t + 1).unwrap();
                        service.with_task(TaskFixture::new(&format!("svc-{s}"), revision, "RUNNING", "RUNNING"))
                    },
                );
                cluster.with_service(service)
            },
        );
        client.with_cluster(cluster)
    })
}

/// Aggregation settings with explicit concurrency limits
#[allow(dead_code)]
pub fn aggregation_config(max_clusters: usize, max_services: usize) -> AggregationConfig {
    AggregationConfig {
        max_concurrent_clusters: max_clusters,
        max_concurrent_services: max_services,
        ..AggregationConfig::default()
    }
}

#[allow(dead_code)]
pub fn aggregator(client: Arc<InMemoryResourceClient>, config: &AggregationConfig) -> ClusterAggregator {
    ClusterAggregator::new(client, config)
}

/// Every record of the tree as a flat string, independent of order
#[allow(dead_code)]
pub fn record_set(clusters: &[ClusterRecord]) -> BTreeSet<String> {
    let mut records = BTreeSet::new();
    for cluster in clusters {
        records.insert(format!("cluster {} {} {}", cluster.name, cluster.running, cluster.pending));
        for service in &cluster.services {
            records.insert(format!(
                "service {}/{} {} {} {}",
                cluster.name,
                service.name,
                service.running,
                service.pending,
                service.tasks.len()
            ));
            for (i, task) in service.tasks.iter().enumerate() {
                records.insert(format!(
                    "task {}/{}#{i} {} {} {}",
                    cluster.name, service.name, task.revision, task.desired_status, task.last_status
                ));
            }
        }
    }
    records
}

/// Total number of records in an aggregation
#[allow(dead_code)]
pub fn record_count(aggregation: &Aggregation) -> usize {
    aggregation
        .clusters
        .iter()
        .map(|c| 1 + c.services.len() + c.fetched_task_count())
        .sum()
}
