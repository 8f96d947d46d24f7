//! Receipts for finalized state-changing ledger calls.

use crate::{SequenceMarker, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier returned by the ledger (hex hash string).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptId(String);

impl ReceiptId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Confirmation that a state-changing ledger call was included and
/// finalized.
///
/// Carries the sequence marker the ledger assigned to the resulting event,
/// which lets an optimistic cache update and the event reconciler share a
/// single ordering comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub marker: SequenceMarker,
    pub timestamp: Timestamp,
}
