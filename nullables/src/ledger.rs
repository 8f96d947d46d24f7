//! Nullable ledger — an in-memory state machine enforcing the same
//! transition rules as the contract.

use async_trait::async_trait;
use atelier_ledger::{LedgerError, LedgerGateway, StatusEntry};
use atelier_types::{
    ArtistAddress, ContentRef, LedgerEvent, LedgerEventKind, Receipt, ReceiptId,
    SequenceMarker, Timestamp, VerificationStatus,
};
use std::collections::HashMap;
use std::sync::Mutex;

struct ArtistState {
    status: VerificationStatus,
    content_ref: Option<ContentRef>,
    last_updated: Timestamp,
}

struct Inner {
    states: HashMap<ArtistAddress, ArtistState>,
    events: Vec<LedgerEvent>,
    next_marker: u64,
    /// Markers at or below this value have been pruned from history.
    pruned_up_to: u64,
    unavailable: bool,
    fail_next: Option<LedgerError>,
    /// Logical clock, advanced on every accepted write.
    clock: u64,
}

/// An in-memory [`LedgerGateway`] for testing.
///
/// Enforces the contract's transition rules (`verified` is terminal,
/// verify/reject require `pending`), assigns monotonically increasing
/// sequence markers, and can simulate outages, one-shot failures, and
/// pruned event history.
pub struct NullLedger {
    inner: Mutex<Inner>,
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                states: HashMap::new(),
                events: Vec::new(),
                next_marker: 1,
                pruned_up_to: 0,
                unavailable: false,
                fail_next: None,
                clock: 1_000,
            }),
        }
    }

    /// Simulate a node outage: every call fails with `Unavailable` until
    /// cleared.
    pub fn set_unavailable(&self, down: bool) {
        self.inner.lock().unwrap().unavailable = down;
    }

    /// Inject a failure returned by the next state-changing call only.
    pub fn fail_next(&self, error: LedgerError) {
        self.inner.lock().unwrap().fail_next = Some(error);
    }

    /// Discard event history up to and including `marker`. A subsequent
    /// `events_since` below that point reports a gap.
    pub fn prune_events_up_to(&self, marker: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.pruned_up_to = inner.pruned_up_to.max(marker);
        let cutoff = SequenceMarker::new(marker);
        inner.events.retain(|e| e.marker > cutoff);
    }

    /// Number of events currently retained, pruning included.
    pub fn event_count(&self) -> usize {
        self.inner.lock().unwrap().events.len()
    }

    /// Events recorded for one artist (retained history only).
    pub fn events_for(&self, artist: &ArtistAddress) -> Vec<LedgerEvent> {
        self.inner
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| e.artist() == artist)
            .cloned()
            .collect()
    }

    fn check_available(inner: &mut Inner) -> Result<(), LedgerError> {
        if inner.unavailable {
            return Err(LedgerError::Unavailable("node offline".into()));
        }
        Ok(())
    }

    fn take_injected_failure(inner: &mut Inner) -> Result<(), LedgerError> {
        match inner.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn record_event(inner: &mut Inner, kind: LedgerEventKind) -> Receipt {
        inner.clock += 1;
        let timestamp = Timestamp::new(inner.clock);
        let marker = SequenceMarker::new(inner.next_marker);
        inner.next_marker += 1;
        inner.events.push(LedgerEvent {
            marker,
            timestamp,
            kind,
        });
        Receipt {
            id: ReceiptId::new(format!("0x{:064x}", marker.as_u64())),
            marker,
            timestamp,
        }
    }
}

#[async_trait]
impl LedgerGateway for NullLedger {
    async fn submit(
        &self,
        artist: &ArtistAddress,
        content_ref: &ContentRef,
    ) -> Result<Receipt, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_available(&mut inner)?;
        Self::take_injected_failure(&mut inner)?;

        if let Some(state) = inner.states.get(artist) {
            if state.status == VerificationStatus::Verified {
                return Err(LedgerError::Rejected(format!("{artist} is already verified")));
            }
        }

        let receipt = Self::record_event(
            &mut inner,
            LedgerEventKind::Submitted {
                artist: artist.clone(),
                content_ref: content_ref.clone(),
            },
        );
        inner.states.insert(
            artist.clone(),
            ArtistState {
                status: VerificationStatus::Pending,
                content_ref: Some(content_ref.clone()),
                last_updated: receipt.timestamp,
            },
        );
        Ok(receipt)
    }

    async fn verify(&self, artist: &ArtistAddress) -> Result<Receipt, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_available(&mut inner)?;
        Self::take_injected_failure(&mut inner)?;

        match inner.states.get(artist) {
            Some(state) if state.status == VerificationStatus::Pending => {}
            Some(state) => {
                return Err(LedgerError::Rejected(format!(
                    "cannot verify {artist}: status is {}",
                    state.status
                )))
            }
            None => {
                return Err(LedgerError::Rejected(format!("{artist} has no submission")))
            }
        }

        let receipt = Self::record_event(
            &mut inner,
            LedgerEventKind::Verified {
                artist: artist.clone(),
            },
        );
        let state = inner.states.get_mut(artist).expect("checked above");
        state.status = VerificationStatus::Verified;
        state.last_updated = receipt.timestamp;
        Ok(receipt)
    }

    async fn reject(
        &self,
        artist: &ArtistAddress,
        _reason: Option<&str>,
    ) -> Result<Receipt, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_available(&mut inner)?;
        Self::take_injected_failure(&mut inner)?;

        match inner.states.get(artist) {
            Some(state) if state.status == VerificationStatus::Pending => {}
            Some(state) => {
                return Err(LedgerError::Rejected(format!(
                    "cannot reject {artist}: status is {}",
                    state.status
                )))
            }
            None => {
                return Err(LedgerError::Rejected(format!("{artist} has no submission")))
            }
        }

        let receipt = Self::record_event(
            &mut inner,
            LedgerEventKind::Rejected {
                artist: artist.clone(),
            },
        );
        let state = inner.states.get_mut(artist).expect("checked above");
        state.status = VerificationStatus::Rejected;
        state.last_updated = receipt.timestamp;
        Ok(receipt)
    }

    async fn status_of(&self, artist: &ArtistAddress) -> Result<StatusEntry, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_available(&mut inner)?;

        Ok(match inner.states.get(artist) {
            Some(state) => StatusEntry {
                status: state.status,
                content_ref: state.content_ref.clone(),
                last_updated: state.last_updated,
            },
            // Contract default for an unknown subject.
            None => StatusEntry {
                status: VerificationStatus::Pending,
                content_ref: None,
                last_updated: Timestamp::EPOCH,
            },
        })
    }

    async fn verified_set(&self) -> Result<Vec<ArtistAddress>, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_available(&mut inner)?;

        let mut verified: Vec<ArtistAddress> = inner
            .states
            .iter()
            .filter(|(_, s)| s.status == VerificationStatus::Verified)
            .map(|(a, _)| a.clone())
            .collect();
        verified.sort();
        Ok(verified)
    }

    async fn events_since(
        &self,
        after: Option<SequenceMarker>,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_available(&mut inner)?;

        if let Some(after) = after {
            if after.as_u64() < inner.pruned_up_to {
                return Err(LedgerError::GapDetected {
                    oldest_retained: SequenceMarker::new(inner.pruned_up_to + 1),
                });
            }
            Ok(inner
                .events
                .iter()
                .filter(|e| e.marker > after)
                .cloned()
                .collect())
        } else {
            Ok(inner.events.clone())
        }
    }
}
