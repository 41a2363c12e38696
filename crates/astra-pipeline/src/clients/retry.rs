//! Retry with exponential back-off and jitter for capability HTTP calls.
//!
//! [`retry_with_backoff`] wraps one batch request and retries on transient
//! failures (network errors, 5xx, 429). Anything else is returned at once so
//! the calling stage can apply its batch fallback.

use std::future::Future;
use std::time::Duration;

use crate::error::CapabilityError;

/// Back-off settings shared by every HTTP capability client.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    /// No retries at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx and HTTP 429.
///
/// **Not retriable:** other statuses, malformed bodies, missing configuration.
pub(crate) fn is_retriable(err: &CapabilityError) -> bool {
    match err {
        CapabilityError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        CapabilityError::Status { status, .. } => *status == 429 || (500..600).contains(status),
        CapabilityError::InvalidResponse { .. } | CapabilityError::NotConfigured(_) => false,
    }
}

/// Runs `operation` with up to `policy.max_retries` additional attempts on
/// transient errors.
///
/// The delay before retry `n` is `backoff_base_ms × 2^(n-1)` with ±25 %
/// jitter, capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    service: &'static str,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, CapabilityError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CapabilityError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = policy
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    service,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "transient capability error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
