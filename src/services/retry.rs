use std::future::Future;
use std::time::Duration;

use crate::error::AppResult;

/// Pause between retry attempts
///
/// Injected so retry loops can be exercised without real delays.
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded retry with a fixed backoff between attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_millis(500))
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Delay after the given failed attempt (1-based)
    pub fn backoff_for(&self, _attempt: u32) -> Duration {
        self.backoff
    }

    /// Runs `operation` until it succeeds or the attempts are exhausted
    ///
    /// The operation receives the 1-based attempt number. The last error is returned when
    /// every attempt fails. A policy with zero attempts still runs once.
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, mut operation: F) -> AppResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(attempt, max_attempts, error = %e, "Attempt failed, retrying");
                    sleeper.sleep(self.backoff_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(attempt, max_attempts, error = %e, "All attempts failed");
                    return Err(e);
                }
            }
        }
    }
}
