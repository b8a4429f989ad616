//! Bounded retry with linear backoff for calls to rate-limited remote services.
//!
//! Callers classify their own error type through [`Classify`]; only
//! [`ErrorClass::Transient`] failures are retried.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

/// Whether a failed call is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Overload or quota exhaustion; the same call may succeed later.
    Transient,
    /// Anything else. Retrying would return the same error.
    Permanent,
}

/// Maps an error onto an [`ErrorClass`].
pub trait Classify {
    fn classify(&self) -> ErrorClass;
}

/// Configuration for retry behavior.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay unit. The wait after failed attempt `i` (1-based) is `i * base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait before the attempt following failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Why a retried call gave up.
#[derive(Debug, Error)]
pub enum RetryError<E: Debug + Display> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    #[error("{0}")]
    Permanent(E),
}

impl<E: Debug + Display> RetryError<E> {
    /// The error returned by the final attempt.
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Permanent(e) => e,
        }
    }
}

/// Run `f` until it succeeds, fails permanently, or `config.max_attempts` is reached.
///
/// # Example
/// ```ignore
/// let text = retry_call(&RetryConfig::default(), "generate_content", || async {
///     provider.generate(prompt).await
/// })
/// .await?;
/// ```
pub async fn retry_call<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    f: F,
) -> Result<T, RetryError<E>>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Debug + Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        operation = operation_name,
                        attempt, "Call succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if err.classify() == ErrorClass::Permanent {
                    warn!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Call failed with permanent error, not retrying"
                    );
                    return Err(RetryError::Permanent(err));
                }

                if attempt >= max_attempts {
                    warn!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Call failed after max attempts"
                    );
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }

                let backoff = config.delay_after(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    error = %err,
                    backoff_ms = backoff.as_millis() as u64,
                    "Call failed, retrying after backoff"
                );

                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
