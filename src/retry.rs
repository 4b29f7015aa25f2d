//! Bounded retry loop for connection establishment.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::MssqlBootstrapError;

/// How many times to attempt a connection and how long to wait between
/// failures.
///
/// The defaults (10 attempts, 5 seconds apart) match the typical
/// wait-for-the-container-to-come-up startup loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A policy that tries exactly once and raises on the first failure.
    #[must_use]
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Drive `attempt` until it succeeds, a terminal error occurs, or the policy
/// is exhausted.
///
/// Transient failures (see [`MssqlBootstrapError::is_transient`]) are logged
/// and retried after `policy.delay`; no sleep follows the final failure.
/// Non-transient failures are returned immediately, whatever the attempt
/// count. The closure receives the 1-based attempt number.
///
/// # Errors
///
/// Returns `MssqlBootstrapError::ConfigError` if `policy.max_attempts` is
/// zero, the terminal error as-is, or
/// `MssqlBootstrapError::RetriesExhausted` once every attempt has failed
/// transiently.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> Result<T, MssqlBootstrapError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, MssqlBootstrapError>>,
{
    if policy.max_attempts == 0 {
        return Err(MssqlBootstrapError::ConfigError(
            "retry policy needs at least one attempt".to_string(),
        ));
    }

    let mut last_error = String::new();
    for n in 1..=policy.max_attempts {
        match attempt(n).await {
            Ok(value) => {
                if n > 1 {
                    info!("attempt {n}/{} succeeded", policy.max_attempts);
                }
                return Ok(value);
            }
            Err(err) if err.is_transient() => {
                warn!(
                    "attempt {n}/{} failed: {err}",
                    policy.max_attempts
                );
                last_error = err.to_string();
                if n < policy.max_attempts {
                    info!("retrying in {:?}", policy.delay);
                    tokio::time::sleep(policy.delay).await;
                }
            }
            Err(err) => return Err(err),
        }
    }

    Err(MssqlBootstrapError::RetriesExhausted {
        attempts: policy.max_attempts,
        last_error,
    })
}
