//! Content store error types.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The identifier is unknown to the store. Never retried.
    #[error("content not found: {0}")]
    NotFound(String),

    /// Transport or service failure. Retryable.
    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
