//! Per-call deadline for control-plane requests.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::domain::ports::{ClientError, Operation};

/// Await a client call, converting an expired deadline into
/// [`ClientError::Timeout`]. `None` waits indefinitely.
pub(crate) async fn call<T, F>(
    operation: Operation,
    limit: Option<Duration>,
    request: F,
) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match limit {
        None => request.await,
        Some(after) => timeout(after, request)
            .await
            .unwrap_or(Err(ClientError::Timeout { operation, after })),
    }
}
