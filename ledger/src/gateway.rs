//! The typed gateway trait over the verification ledger.

use crate::error::LedgerError;
use async_trait::async_trait;
use atelier_types::{
    ArtistAddress, ContentRef, LedgerEvent, Receipt, SequenceMarker, Timestamp,
    VerificationStatus,
};

/// One artist's state as read from the ledger.
///
/// For a subject the ledger has never seen this reads as the contract
/// default: `Pending`, no content reference, epoch timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEntry {
    pub status: VerificationStatus,
    pub content_ref: Option<ContentRef>,
    pub last_updated: Timestamp,
}

impl StatusEntry {
    /// Whether this is the contract-default entry for an unknown subject.
    pub fn is_unknown_subject(&self) -> bool {
        self.status == VerificationStatus::Pending
            && self.content_ref.is_none()
            && self.last_updated == Timestamp::EPOCH
    }
}

/// Typed wrapper over the artist-verification ledger contract.
///
/// State-changing calls return a [`Receipt`] once the write is finalized;
/// they fail with [`LedgerError::Rejected`] (not retryable) or
/// [`LedgerError::Unavailable`] (retryable). Event history is pulled with
/// [`events_since`]; [`crate::EventStream`] turns that into a lazy,
/// infinite, restartable sequence.
///
/// [`events_since`]: LedgerGateway::events_since
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Record a profile submission for `artist`, moving it to `Pending`.
    async fn submit(
        &self,
        artist: &ArtistAddress,
        content_ref: &ContentRef,
    ) -> Result<Receipt, LedgerError>;

    /// Mark `artist` as verified. Privileged.
    async fn verify(&self, artist: &ArtistAddress) -> Result<Receipt, LedgerError>;

    /// Mark `artist` as rejected. Privileged.
    async fn reject(
        &self,
        artist: &ArtistAddress,
        reason: Option<&str>,
    ) -> Result<Receipt, LedgerError>;

    /// Read the current status entry for `artist`.
    async fn status_of(&self, artist: &ArtistAddress) -> Result<StatusEntry, LedgerError>;

    /// All currently verified artist addresses.
    async fn verified_set(&self) -> Result<Vec<ArtistAddress>, LedgerError>;

    /// Events with a marker strictly greater than `after`, oldest first.
    /// `None` means "from the oldest retained event".
    ///
    /// Fails with [`LedgerError::GapDetected`] when `after` predates the
    /// retained history window.
    async fn events_since(
        &self,
        after: Option<SequenceMarker>,
    ) -> Result<Vec<LedgerEvent>, LedgerError>;
}
