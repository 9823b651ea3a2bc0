//! Raw describe output, projected to the fields the aggregator reads.

use serde::{Deserialize, Serialize};

/// One entry of a describe-clusters response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Opaque identifier used for every child query
    pub arn: String,
    pub name: String,
    pub running_tasks_count: i64,
    pub pending_tasks_count: i64,
}

/// One entry of a describe-services response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub name: String,
    pub running_count: i64,
    pub pending_count: i64,
}

/// One entry of a describe-tasks response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task_arn: String,
    /// Colon-delimited task definition reference, revision last
    pub task_definition_arn: String,
    pub desired_status: String,
    pub last_status: String,
}
