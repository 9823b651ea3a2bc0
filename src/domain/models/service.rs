//! Service record model.

use serde::{Deserialize, Serialize};

use crate::domain::models::summary::ServiceSummary;
use crate::domain::models::task::TaskRecord;

/// A service and the tasks it owned at query time.
///
/// The owning cluster is referenced by identifier only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub cluster_arn: String,
    pub name: String,
    /// Running count as reported by the control plane
    pub running: i64,
    /// Pending count as reported by the control plane
    pub pending: i64,
    pub tasks: Vec<TaskRecord>,
}

impl ServiceRecord {
    /// Shell record with no tasks attached yet
    pub fn from_summary(cluster_arn: &str, summary: &ServiceSummary) -> Self {
        Self {
            cluster_arn: cluster_arn.to_string(),
            name: summary.name.clone(),
            running: summary.running_count,
            pending: summary.pending_count,
            tasks: Vec::new(),
        }
    }

    /// Attach the collected tasks, consuming the shell
    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<TaskRecord>) -> Self {
        self.tasks = tasks;
        self
    }
}
