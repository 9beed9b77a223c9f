//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the wait for upstream response headers
//! - Leave the streamed body unbounded once headers have arrived
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A zero setting disables the bound entirely
//! - Dropping the timed-out future cancels the upstream call

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The upstream did not produce response headers in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("upstream did not respond within {0:?}")]
pub struct DeadlineExceeded(pub Duration);

/// Convert a seconds setting into an optional bound (zero = none).
pub fn from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Await `future`, failing if `deadline` elapses first.
pub async fn within<F>(deadline: Option<Duration>, future: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| DeadlineExceeded(limit)),
        None => Ok(future.await),
    }
}
