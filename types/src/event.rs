//! Ledger events and their ordering markers.

use crate::{ArtistAddress, ContentRef, Timestamp, VerificationStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically ordered tag the ledger attaches to every event.
///
/// Used to detect duplicates (marker already applied) and gaps (history
/// before a marker no longer retained). Opaque — consumers compare, they
/// never compute.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SequenceMarker(u64);

impl SequenceMarker {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An event observed on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub marker: SequenceMarker,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub kind: LedgerEventKind,
}

/// The state transition an event describes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEventKind {
    Submitted {
        artist: ArtistAddress,
        content_ref: ContentRef,
    },
    Verified {
        artist: ArtistAddress,
    },
    Rejected {
        artist: ArtistAddress,
    },
}

impl LedgerEvent {
    /// The artist this event is about.
    pub fn artist(&self) -> &ArtistAddress {
        match &self.kind {
            LedgerEventKind::Submitted { artist, .. }
            | LedgerEventKind::Verified { artist }
            | LedgerEventKind::Rejected { artist } => artist,
        }
    }

    /// The status this event moves the artist to.
    pub fn status(&self) -> VerificationStatus {
        match &self.kind {
            LedgerEventKind::Submitted { .. } => VerificationStatus::Pending,
            LedgerEventKind::Verified { .. } => VerificationStatus::Verified,
            LedgerEventKind::Rejected { .. } => VerificationStatus::Rejected,
        }
    }

    /// The content reference carried by the event, if any.
    pub fn content_ref(&self) -> Option<&ContentRef> {
        match &self.kind {
            LedgerEventKind::Submitted { content_ref, .. } => Some(content_ref),
            _ => None,
        }
    }
}
