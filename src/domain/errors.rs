//! Domain errors for the ecsview aggregation engine.

use thiserror::Error;

use crate::domain::ports::ClientError;

/// Errors that abort an aggregation or reject malformed input.
///
/// Failures below the cluster level never surface here; they are carried as
/// [`ScopedError`](crate::domain::models::ScopedError) entries next to the
/// records they affected.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Failed to list clusters: {0}")]
    ClusterDiscovery(ClientError),

    #[error("Failed to describe clusters: {0}")]
    ClusterDescription(ClientError),

    #[error("Aggregation cancelled")]
    Cancelled,

    #[error("Malformed task definition reference: {0:?} has no numeric revision")]
    MalformedTaskDefinition(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether the error stopped the aggregation before any record was built
    pub const fn is_discovery_failure(&self) -> bool {
        matches!(self, Self::ClusterDiscovery(_) | Self::ClusterDescription(_))
    }
}

/// Failure confined to one branch of the hierarchy
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("collector panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Operation;

    #[test]
    fn test_discovery_errors_are_fatal() {
        let err = DomainError::ClusterDiscovery(ClientError::api(
            Operation::ListClusters,
            "ExpiredToken",
        ));
        assert!(err.is_discovery_failure());
        assert_eq!(
            err.to_string(),
            "Failed to list clusters: ListClusters failed: ExpiredToken"
        );
        assert!(!DomainError::Cancelled.is_discovery_failure());
    }

    #[test]
    fn test_collection_error_is_transparent() {
        let err: CollectionError = ClientError::api(Operation::ListTasks, "Throttling").into();
        assert_eq!(err.to_string(), "ListTasks failed: Throttling");
    }
}
