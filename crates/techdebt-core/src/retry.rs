// SPDX-License-Identifier: Apache-2.0

//! Retry logic with exponential backoff for transient failures.
//!
//! Every remote call runs under a per-attempt timeout. Only
//! [`TechDebtError::TransientNetwork`] is retried; authentication, validation
//! and other API errors are returned after the first attempt.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::error::TechDebtError;

/// Creates the backoff schedule for `config`.
///
/// - Factor: 2
/// - Min delay: `base_delay_ms`
/// - Max times: `max_attempts - 1` retries after the first attempt
/// - No jitter, so the schedule is deterministic (1s, 2s with defaults)
#[must_use]
pub fn retry_backoff(config: &RetryConfig) -> ExponentialBuilder {
    let retries = usize::try_from(config.max_attempts.saturating_sub(1)).unwrap_or(usize::MAX);
    ExponentialBuilder::default()
        .with_factor(2.0)
        .with_min_delay(Duration::from_millis(config.base_delay_ms))
        .with_max_times(retries)
}

/// Runs `attempt` with a per-attempt `timeout`, retrying transient failures.
///
/// A timed-out attempt counts as a transient network failure.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-transient error.
pub async fn with_retry<T, F, Fut>(
    operation: &'static str,
    config: &RetryConfig,
    timeout: Duration,
    mut attempt: F,
) -> Result<T, TechDebtError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TechDebtError>>,
{
    let timed = || {
        let fut = attempt();
        async move {
            match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(TechDebtError::TransientNetwork {
                    message: format!("request timed out after {}s", timeout.as_secs()),
                }),
            }
        }
    };

    let result = timed
        .retry(retry_backoff(config))
        .when(TechDebtError::is_transient)
        .notify(|err, dur| {
            warn!(
                operation,
                error = %err,
                retry_after = ?dur,
                "Retrying after transient failure"
            );
        })
        .await;

    if let Err(err) = &result {
        debug!(operation, kind = ?err.kind(), "Request failed");
    }
    result
}
