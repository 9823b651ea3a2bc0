use std::time::Duration;

use thiserror::Error;

use super::resource_client::Operation;

/// Errors returned by a [`ResourceClient`](super::ResourceClient) call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("{operation} failed: {message}")]
    Api {
        operation: Operation,
        message: String,
    },

    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: Operation,
        after: Duration,
    },
}

impl ClientError {
    /// Build an API error for the given operation
    pub fn api(operation: Operation, message: impl Into<String>) -> Self {
        Self::Api {
            operation,
            message: message.into(),
        }
    }

    /// Name of the client operation that failed
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Api { operation, .. } | Self::Timeout { operation, .. } => *operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ClientError::api(Operation::ListServices, "AccessDenied");
        assert_eq!(err.to_string(), "ListServices failed: AccessDenied");
        assert_eq!(err.operation(), Operation::ListServices);
    }

    #[test]
    fn test_timeout_display() {
        let err = ClientError::Timeout {
            operation: Operation::DescribeTasks,
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "DescribeTasks timed out after 30s");
    }
}
