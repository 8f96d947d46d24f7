//! Error taxonomy for the verification core.
//!
//! Collaborator failures are wrapped with the originating operation so
//! callers can tell "my write failed" apart from "I can't confirm the
//! read".

use atelier_ledger::LedgerError;
use atelier_store::StoreError;
use atelier_types::{ArtistAddress, ValidationError};
use std::fmt;
use thiserror::Error;

/// The orchestrator operation an error originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Submit,
    Verify,
    Reject,
    Resolve,
    ListVerified,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Submit => "submit",
            Op::Verify => "verify",
            Op::Reject => "reject",
            Op::Resolve => "resolve",
            Op::ListVerified => "list_verified",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum VerificationError {
    /// Malformed address or payload, rejected before any external call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The caller lacks the capability for this write.
    #[error("{op}: caller {caller} may not act on {artist}")]
    NotAuthorized {
        op: Op,
        caller: ArtistAddress,
        artist: ArtistAddress,
    },

    /// Content store transport failure. Retryable.
    #[error("{op}: storage unavailable: {reason}")]
    StorageUnavailable { op: Op, reason: String },

    /// Ledger transport failure. Retryable.
    #[error("{op}: ledger unavailable: {reason}")]
    LedgerUnavailable { op: Op, reason: String },

    /// The ledger refused the call; the reason is surfaced verbatim.
    #[error("{op}: rejected by ledger: {reason}")]
    LedgerRejected { op: Op, reason: String },

    /// Content or subject unknown.
    #[error("{op}: not found: {what}")]
    NotFound { op: Op, what: String },
}

impl VerificationError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. } | Self::LedgerUnavailable { .. }
        )
    }

    /// Wrap a store error with its originating operation.
    pub fn from_store(op: Op, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound { op, what },
            StoreError::Unavailable(reason) => Self::StorageUnavailable { op, reason },
        }
    }

    /// Wrap a ledger error with its originating operation.
    ///
    /// `GapDetected` is an event-stream integrity failure consumed by the
    /// reconciler; if one ever reaches a direct call path it is treated as
    /// an unavailable ledger rather than surfaced as a user error.
    pub fn from_ledger(op: Op, err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected(reason) => Self::LedgerRejected { op, reason },
            LedgerError::Unavailable(reason) => Self::LedgerUnavailable { op, reason },
            LedgerError::GapDetected { oldest_retained } => Self::LedgerUnavailable {
                op,
                reason: format!("event history gap (oldest retained {oldest_retained})"),
            },
        }
    }
}
