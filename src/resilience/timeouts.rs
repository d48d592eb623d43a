//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap signer and backend calls with an optional deadline
//! - Report expiry as a distinct error so callers can classify it

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The wrapped future did not finish before its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timed out after {0:?}")]
pub struct TimedOut(pub Duration);

/// Convert a seconds setting where 0 means "no limit".
pub fn optional_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Await `fut`, bounded by `limit` when one is set.
pub async fn with_optional_timeout<F, T>(limit: Option<Duration>, fut: F) -> Result<T, TimedOut>
where
    F: Future<Output = T>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| TimedOut(limit)),
        None => Ok(fut.await),
    }
}
