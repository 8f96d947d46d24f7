//! Retry policy for transient collaborator failures.
//!
//! Retries apply only to unavailable-class errors; rejections and
//! not-found are surfaced on the first attempt.

use std::future::Future;
use std::time::Duration;

/// Errors that can say whether another attempt may succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for atelier_store::StoreError {
    fn is_retryable(&self) -> bool {
        self.is_retryable()
    }
}

impl Retryable for atelier_ledger::LedgerError {
    fn is_retryable(&self) -> bool {
        self.is_retryable()
    }
}

/// Capped exponential backoff with a maximum attempt count.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `attempt + 1` (zero-based attempt index).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let doubled = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt));
        doubled.min(self.max_backoff)
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or
    /// `max_attempts` is reached.
    pub async fn run<T, E, Fut, F>(&self, what: &str, mut call: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let mut attempt = 0u32;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    let backoff = self.backoff_for(attempt);
                    tracing::warn!(
                        what,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
