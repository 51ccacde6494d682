//! Politeness helpers: cancellable pauses and retry backoff
//!
//! The traversal engine pauses between index pages and every client backs
//! off on 429 and 5xx responses. Pauses are suspension points that a
//! cancellation token can cut short.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Longest honored `Retry-After`
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Wait used for a 429 without a usable `Retry-After` header
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Sleep for `duration` unless `cancel` fires first.
///
/// Returns `false` when the pause was cut short by cancellation.
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if duration.is_zero() {
        return true;
    }

    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

/// Exponential backoff: `base`, `2 * base`, `4 * base`, ... for attempts 1, 2, 3, ...
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(10);
    base.saturating_mul(2u32.pow(exponent))
}

/// Delay requested by a `Retry-After` header given in seconds, capped.
pub fn retry_after_delay(header: Option<&str>) -> Duration {
    header
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
        .min(MAX_RETRY_AFTER)
}
