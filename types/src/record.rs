//! Verification status and the per-artist record.

use crate::{ArtistAddress, ArtistProfile, ContentRef, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The verification state of an artist, as recorded on the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Submitted, awaiting a decision.
    Pending,
    /// Approved. Terminal — no further transitions.
    Verified,
    /// Declined. A resubmission returns the artist to `Pending`.
    Rejected,
}

impl VerificationStatus {
    /// Whether any further ledger transition is possible from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    /// Decode the ledger's numeric status encoding.
    pub fn from_ledger_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Verified),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full view of one artist's verification state.
///
/// `status`, `content_ref`, and `last_updated` are ledger-sourced and
/// authoritative. `profile` is best-effort enrichment from the content
/// store; `None` means the content was unavailable, not that the record
/// is invalid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub artist: ArtistAddress,
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_ref: Option<ContentRef>,
    pub last_updated: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ArtistProfile>,
}

impl VerificationRecord {
    /// A record carrying ledger state only, with no profile enrichment.
    pub fn degraded(
        artist: ArtistAddress,
        status: VerificationStatus,
        content_ref: Option<ContentRef>,
        last_updated: Timestamp,
    ) -> Self {
        Self {
            artist,
            status,
            content_ref,
            last_updated,
            profile: None,
        }
    }
}
