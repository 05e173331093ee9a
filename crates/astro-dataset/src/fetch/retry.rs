use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

/// Bounded retry with exponential backoff.
///
/// Before attempt `n + 1` the policy waits `base_delay * 2^(n - 1)`, so with
/// the defaults the waits are 2 s and 4 s before attempts 2 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

/// Why [`RetryPolicy::run`] gave up.
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Number of attempts made, including the failing one.
    pub attempts: u32,
    /// `true` when the last error was transient and the budget ran out.
    pub exhausted: bool,
    pub error: E,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is spent. `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(
        &self,
        is_transient: impl Fn(&E) -> bool,
        mut op: F,
    ) -> Result<T, RetryFailure<E>>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !is_transient(&e) => {
                    return Err(RetryFailure {
                        attempts: attempt,
                        exhausted: false,
                        error: e,
                    });
                }
                Err(e) if attempt >= max_attempts => {
                    error!(attempts = attempt, error = %e, "giving up after transient failures");
                    return Err(RetryFailure {
                        attempts: attempt,
                        exhausted: true,
                        error: e,
                    });
                }
                Err(e) => {
                    let wait = self.backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}
