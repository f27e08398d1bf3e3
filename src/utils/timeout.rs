//! Timeout helpers for the async client and server paths.

use std::future::Future;
use std::time::Duration;

use crate::error::{ProtocolError, Result};

/// Default time to wait for a reply datagram
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `fut`, failing with [`ProtocolError::Timeout`] if it takes longer than `duration`.
pub async fn with_timeout_error<F, T>(fut: F, duration: Duration) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProtocolError::Timeout),
    }
}
