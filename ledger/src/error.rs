//! Ledger gateway error types.

use atelier_types::SequenceMarker;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// The ledger refused the call (unauthorized caller, invalid state
    /// transition, malformed address). Never retried; the reason is
    /// surfaced verbatim.
    #[error("rejected by ledger: {0}")]
    Rejected(String),

    /// Network or node failure. Retryable.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The event history before the requested marker is no longer
    /// retained. The consumer must resync from `oldest_retained`.
    #[error("event history gap: oldest retained marker is {oldest_retained}")]
    GapDetected { oldest_retained: SequenceMarker },
}

impl LedgerError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
