//! Aggregation results and the scoped-error side channel.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::errors::CollectionError;
use crate::domain::models::cluster::ClusterRecord;

/// Location in the hierarchy where a scoped failure occurred
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum ResourcePath {
    /// Service discovery for a cluster failed
    Cluster { cluster: String },
    /// Task discovery for a service failed
    Service { cluster: String, service: String },
}

impl ResourcePath {
    pub fn cluster(cluster: impl Into<String>) -> Self {
        Self::Cluster {
            cluster: cluster.into(),
        }
    }

    pub fn service(cluster: impl Into<String>, service: impl Into<String>) -> Self {
        Self::Service {
            cluster: cluster.into(),
            service: service.into(),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster { cluster } => write!(f, "{cluster}"),
            Self::Service { cluster, service } => write!(f, "{cluster}/{service}"),
        }
    }
}

/// A failure that emptied one branch without aborting its siblings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedError {
    pub path: ResourcePath,
    pub error: CollectionError,
}

impl ScopedError {
    pub fn new(path: ResourcePath, error: impl Into<CollectionError>) -> Self {
        Self {
            path,
            error: error.into(),
        }
    }
}

impl fmt::Display for ScopedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

impl Serialize for ScopedError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScopedError", 2)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("error", &self.error.to_string())?;
        state.end()
    }
}

/// Items produced by a collector plus the failures of its sub-collectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub errors: Vec<ScopedError>,
}

impl<T> Collected<T> {
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// One finished cluster subtree, as emitted by the streaming aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterOutcome {
    pub cluster: ClusterRecord,
    pub errors: Vec<ScopedError>,
    /// Position of the cluster in the describe-clusters response
    #[serde(skip)]
    pub position: usize,
}

/// Fully materialized aggregation result
#[derive(Debug, Clone, Serialize)]
pub struct Aggregation {
    /// Clusters in describe-clusters order
    pub clusters: Vec<ClusterRecord>,
    /// Scoped failures from every level, grouped by cluster order
    pub errors: Vec<ScopedError>,
    pub fetched_at: DateTime<Utc>,
}

impl Aggregation {
    /// Assemble a snapshot from outcomes received in any order
    pub fn from_outcomes(mut outcomes: Vec<ClusterOutcome>, fetched_at: DateTime<Utc>) -> Self {
        outcomes.sort_by_key(|outcome| outcome.position);

        let mut clusters = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        for outcome in outcomes {
            clusters.push(outcome.cluster);
            errors.extend(outcome.errors);
        }

        Self {
            clusters,
            errors,
            fetched_at,
        }
    }

    /// Whether every branch was populated without a scoped failure
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn cluster(&self, name: &str) -> Option<&ClusterRecord> {
        self.clusters.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ClientError, Operation};

    fn outcome(name: &str, position: usize) -> ClusterOutcome {
        ClusterOutcome {
            cluster: ClusterRecord {
                arn: format!("arn:cluster/{name}"),
                name: name.to_string(),
                running: 0,
                pending: 0,
                services: vec![],
            },
            errors: vec![],
            position,
        }
    }

    #[test]
    fn test_path_display() {
        assert_eq!(ResourcePath::cluster("prod").to_string(), "prod");
        assert_eq!(ResourcePath::service("prod", "api").to_string(), "prod/api");
    }

    #[test]
    fn test_scoped_error_serializes_message() {
        let err = ScopedError::new(
            ResourcePath::service("prod", "api"),
            ClientError::api(Operation::ListTasks, "AccessDenied"),
        );
        assert_eq!(err.to_string(), "prod/api: ListTasks failed: AccessDenied");

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["path"]["level"], "service");
        assert_eq!(json["path"]["service"], "api");
        assert_eq!(json["error"], "ListTasks failed: AccessDenied");
    }

    #[test]
    fn test_from_outcomes_restores_describe_order() {
        let mut late = outcome("stage", 1);
        late.errors.push(ScopedError::new(
            ResourcePath::cluster("stage"),
            ClientError::api(Operation::ListServices, "boom"),
        ));
        let aggregation = Aggregation::from_outcomes(vec![late, outcome("prod", 0)], Utc::now());

        let names: Vec<_> = aggregation.clusters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["prod", "stage"]);
        assert_eq!(aggregation.errors.len(), 1);
        assert!(!aggregation.is_complete());
        assert!(aggregation.cluster("prod").is_some());
    }
}
