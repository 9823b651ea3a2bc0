//! Cluster record model.
//!
//! Root of the cluster → service → task tree.

use serde::{Deserialize, Serialize};

use crate::domain::models::service::ServiceRecord;
use crate::domain::models::summary::ClusterSummary;

/// A cluster and the services it owned at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    /// Opaque identifier used for all child queries
    pub arn: String,
    pub name: String,
    /// Running task count as reported by describe-clusters
    pub running: i64,
    /// Pending task count as reported by describe-clusters
    pub pending: i64,
    pub services: Vec<ServiceRecord>,
}

impl ClusterRecord {
    /// Shell record with no services attached yet
    pub fn from_summary(summary: &ClusterSummary) -> Self {
        Self {
            arn: summary.arn.clone(),
            name: summary.name.clone(),
            running: summary.running_tasks_count,
            pending: summary.pending_tasks_count,
            services: Vec::new(),
        }
    }

    /// Attach the collected services, consuming the shell
    #[must_use]
    pub fn with_services(mut self, services: Vec<ServiceRecord>) -> Self {
        self.services = services;
        self
    }

    /// Look up a service by name
    pub fn service(&self, name: &str) -> Option<&ServiceRecord> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Number of task records actually fetched under this cluster.
    ///
    /// Unrelated to `running`/`pending`, which are never reconciled.
    pub fn fetched_task_count(&self) -> usize {
        self.services.iter().map(|s| s.tasks.len()).sum()
    }
}
