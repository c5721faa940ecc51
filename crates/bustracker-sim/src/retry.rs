//! Reconnect policy for bus streams.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Fixed-backoff retry around a fallible async operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts before giving up. `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Pause between a failure and the next attempt.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds or the attempts run out.
    ///
    /// Returns the last error once `max_attempts` failures have happened.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if self.max_attempts.is_some_and(|max| attempt >= max) {
                        warn!(label, attempt, error = %e, "Giving up");
                        return Err(e);
                    }
                    warn!(
                        label,
                        attempt,
                        error = %e,
                        backoff_ms = self.backoff.as_millis(),
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}
