//! Retry policy with exponential backoff for remote board calls.

use crate::board::{domain::OperationError, ports::GatewayError};
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = NonZeroU32::MIN.saturating_add(2);
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_BACKOFF_MULTIPLIER: u32 = 2;
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// How often and how patiently transient failures are retried.
///
/// The delay after the `n`th failed attempt is
/// `base_delay * backoff_multiplier^(n - 1)`, capped at `max_delay`. A
/// server-provided retry hint replaces the computed delay, still capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    base_delay: Duration,
    backoff_multiplier: u32,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the default multiplier and delay cap.
    #[must_use]
    pub const fn new(max_attempts: NonZeroU32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// Creates a policy that makes exactly one attempt.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(NonZeroU32::MIN, Duration::ZERO)
    }

    /// Sets the factor applied to the delay after each failure.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: u32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Sets the upper bound for any single delay.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Returns the attempt ceiling, first attempt included.
    #[must_use]
    pub const fn max_attempts(&self) -> NonZeroU32 {
        self.max_attempts
    }

    /// Returns the delay after the first failure.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the delay to wait after `failed_attempt` (1-based) failed.
    #[must_use]
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        self.backoff_multiplier
            .checked_pow(failed_attempt.saturating_sub(1))
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    fn delay_for(&self, failed_attempt: u32, error: &GatewayError) -> Duration {
        error.retry_after().map_or_else(
            || self.delay_after(failed_attempt),
            |hint| hint.min(self.max_delay),
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

/// Maps a terminal gateway failure to the per-item error taxonomy.
pub(crate) fn into_operation_error(error: GatewayError, attempts: u32) -> OperationError {
    match error {
        GatewayError::Unauthorized(message) => OperationError::Auth(message),
        GatewayError::NotFound(message) => OperationError::NotFound(message),
        GatewayError::Rejected(message) => OperationError::Rejected(message),
        transient @ (GatewayError::RateLimited { .. } | GatewayError::Network(_)) => {
            OperationError::Transient {
                attempts,
                cause: transient.to_string(),
            }
        }
    }
}

/// Runs `attempt` until it succeeds, fails permanently, exhausts the policy,
/// or `cancel` fires while waiting between attempts.
///
/// An attempt already in flight is never interrupted.
pub(crate) async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    operation: &'static str,
    mut attempt: F,
) -> Result<T, OperationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let max_attempts = policy.max_attempts().get();
    let mut attempts_made = 0_u32;
    loop {
        attempts_made += 1;
        let error = match attempt().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        if !error.is_retryable() || attempts_made >= max_attempts {
            return Err(into_operation_error(error, attempts_made));
        }

        let delay = policy.delay_for(attempts_made, &error);
        warn!(
            operation,
            attempt = attempts_made,
            max_attempts,
            ?delay,
            error = %error,
            "transient failure, backing off"
        );
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(OperationError::Cancelled),
            () = tokio::time::sleep(delay) => {}
        }
    }
}
