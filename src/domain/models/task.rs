//! Task record model.
//!
//! Leaf of the cluster → service → task tree.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::summary::TaskSummary;

/// Normalized view of one task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task definition revision, or [`TaskRecord::UNKNOWN_REVISION`]
    pub revision: u32,
    pub desired_status: String,
    pub last_status: String,
}

impl TaskRecord {
    /// Revision recorded when the definition reference has no numeric suffix
    pub const UNKNOWN_REVISION: u32 = 0;

    /// Project a described task. Never fails: an unparseable definition
    /// reference degrades to [`Self::UNKNOWN_REVISION`].
    pub fn from_summary(summary: &TaskSummary) -> Self {
        let revision = match try_parse_revision(&summary.task_definition_arn) {
            Ok(revision) => revision,
            Err(err) => {
                tracing::debug!(
                    task = %summary.task_arn,
                    error = %err,
                    "falling back to unknown revision"
                );
                Self::UNKNOWN_REVISION
            }
        };

        Self {
            revision,
            desired_status: summary.desired_status.clone(),
            last_status: summary.last_status.clone(),
        }
    }
}

/// Best-effort revision parsing: the final `:`-delimited segment as an
/// integer, or [`TaskRecord::UNKNOWN_REVISION`].
pub fn parse_revision(reference: &str) -> u32 {
    try_parse_revision(reference).unwrap_or(TaskRecord::UNKNOWN_REVISION)
}

/// Strict revision parsing.
///
/// Revisions are assumed non-negative, so a signed suffix such as `api:-3`
/// is rejected rather than read as a negative revision.
pub fn try_parse_revision(reference: &str) -> DomainResult<u32> {
    reference
        .rsplit(':')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .ok_or_else(|| DomainError::MalformedTaskDefinition(reference.to_string()))
}
