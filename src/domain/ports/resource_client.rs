use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::models::{ClusterSummary, ServiceSummary, TaskSummary};
use crate::domain::ports::errors::ClientError;

/// Control-plane operations the aggregator issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    ListClusters,
    DescribeClusters,
    ListServices,
    DescribeServices,
    ListTasks,
    DescribeTasks,
}

impl Operation {
    /// All operations, in hierarchy order
    pub const ALL: [Self; 6] = [
        Self::ListClusters,
        Self::DescribeClusters,
        Self::ListServices,
        Self::DescribeServices,
        Self::ListTasks,
        Self::DescribeTasks,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ListClusters => "ListClusters",
            Self::DescribeClusters => "DescribeClusters",
            Self::ListServices => "ListServices",
            Self::DescribeServices => "DescribeServices",
            Self::ListTasks => "ListTasks",
            Self::DescribeTasks => "DescribeTasks",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only capability over the remote control plane.
///
/// One instance is shared by every concurrent unit of an aggregation, so
/// implementations must not rely on per-call mutable state. Rate limiting
/// toward the remote API belongs here, not in the callers.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// List identifiers of every cluster visible to the caller
    async fn list_clusters(&self) -> Result<Vec<String>, ClientError>;

    /// Describe a batch of clusters by identifier
    async fn describe_clusters(
        &self,
        clusters: &[String],
    ) -> Result<Vec<ClusterSummary>, ClientError>;

    /// List service identifiers within a cluster
    async fn list_services(&self, cluster: &str) -> Result<Vec<String>, ClientError>;

    /// Describe a batch of services within a cluster
    async fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> Result<Vec<ServiceSummary>, ClientError>;

    /// List task identifiers for one service of a cluster
    async fn list_tasks(&self, cluster: &str, service: &str) -> Result<Vec<String>, ClientError>;

    /// Describe a batch of tasks within a cluster
    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[String],
    ) -> Result<Vec<TaskSummary>, ClientError>;
}
