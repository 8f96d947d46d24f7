//! Marker-gated in-memory projection of ledger state.
//!
//! The cache is a read-through projection: staleness is tolerated,
//! inconsistency with a fresh ledger read is not. Both cache writers (the
//! event reconciler and optimistic post-receipt updates) go through
//! [`StatusCache::apply`], so they share one per-artist sequence-marker
//! comparison and a stale event can never overwrite a newer confirmed
//! write.

use atelier_types::{ArtistAddress, SequenceMarker, VerificationRecord};
use std::collections::HashMap;
use std::sync::RwLock;

struct CacheEntry {
    record: VerificationRecord,
    /// Highest marker applied for this artist.
    marker: Option<SequenceMarker>,
    /// Set after an event-history gap; a stale entry is invisible to
    /// [`StatusCache::get`] until refreshed by a resolver pass.
    stale: bool,
}

/// Shared cache of per-artist verification records.
///
/// Reads clone out snapshots under a brief read guard; they never wait on
/// ledger or store I/O.
#[derive(Default)]
pub struct StatusCache {
    entries: RwLock<HashMap<ArtistAddress, CacheEntry>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a fresh (non-stale) cached record.
    pub fn get(&self, artist: &ArtistAddress) -> Option<VerificationRecord> {
        let entries = self.entries.read().unwrap();
        entries
            .get(artist)
            .filter(|e| !e.stale)
            .map(|e| e.record.clone())
    }

    /// Snapshot of a cached record regardless of staleness. Used by the
    /// reconciler to carry profile enrichment across status transitions.
    pub fn peek(&self, artist: &ArtistAddress) -> Option<VerificationRecord> {
        let entries = self.entries.read().unwrap();
        entries.get(artist).map(|e| e.record.clone())
    }

    /// The highest sequence marker applied for an artist.
    pub fn applied_marker(&self, artist: &ArtistAddress) -> Option<SequenceMarker> {
        let entries = self.entries.read().unwrap();
        entries.get(artist).and_then(|e| e.marker)
    }

    /// Apply a ledger-confirmed update carrying a sequence marker.
    ///
    /// Returns `false` (and leaves the cache untouched) when the artist's
    /// applied marker is already at or past `marker` — duplicate and
    /// out-of-order deliveries are dropped here.
    pub fn apply(&self, record: VerificationRecord, marker: SequenceMarker) -> bool {
        let mut entries = self.entries.write().unwrap();
        let entry = entries.get_mut(&record.artist);
        if let Some(entry) = entry {
            if entry.marker.is_some_and(|applied| applied >= marker) {
                return false;
            }
            entry.record = record;
            entry.marker = Some(marker);
            entry.stale = false;
        } else {
            entries.insert(
                record.artist.clone(),
                CacheEntry {
                    record,
                    marker: Some(marker),
                    stale: false,
                },
            );
        }
        true
    }

    /// Store the result of a fresh resolver pass.
    ///
    /// A resolver read is authoritative for the record but carries no
    /// marker, so the applied marker is preserved — a later event older
    /// than the last applied one still gets dropped.
    pub fn store_resolved(&self, record: VerificationRecord) {
        let mut entries = self.entries.write().unwrap();
        match entries.get_mut(&record.artist) {
            Some(entry) => {
                entry.record = record;
                entry.stale = false;
            }
            None => {
                entries.insert(
                    record.artist.clone(),
                    CacheEntry {
                        record,
                        marker: None,
                        stale: false,
                    },
                );
            }
        }
    }

    /// Hide an artist's entry from reads until the next resolver pass.
    pub fn mark_stale(&self, artist: &ArtistAddress) {
        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = entries.get_mut(artist) {
            entry.stale = true;
        }
    }

    /// Hide every entry from reads until refreshed. Used after an event
    /// history gap, when any cached status may have been superseded by a
    /// lost event.
    pub fn mark_all_stale(&self) {
        let mut entries = self.entries.write().unwrap();
        for entry in entries.values_mut() {
            entry.stale = true;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_types::{Timestamp, VerificationStatus};
    use proptest::prelude::*;

    fn addr() -> ArtistAddress {
        ArtistAddress::parse("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap()
    }

    fn record(status: VerificationStatus, secs: u64) -> VerificationRecord {
        VerificationRecord::degraded(addr(), status, None, Timestamp::new(secs))
    }

    #[test]
    fn apply_then_get() {
        let cache = StatusCache::new();
        assert!(cache.apply(record(VerificationStatus::Pending, 1), SequenceMarker::new(1)));
        let got = cache.get(&addr()).unwrap();
        assert_eq!(got.status, VerificationStatus::Pending);
        assert_eq!(cache.applied_marker(&addr()), Some(SequenceMarker::new(1)));
    }

    #[test]
    fn duplicate_marker_is_dropped() {
        let cache = StatusCache::new();
        assert!(cache.apply(record(VerificationStatus::Verified, 2), SequenceMarker::new(5)));
        let before = cache.get(&addr());
        assert!(!cache.apply(record(VerificationStatus::Rejected, 3), SequenceMarker::new(5)));
        assert_eq!(cache.get(&addr()), before);
    }

    #[test]
    fn older_marker_never_overwrites() {
        let cache = StatusCache::new();
        assert!(cache.apply(record(VerificationStatus::Verified, 2), SequenceMarker::new(9)));
        assert!(!cache.apply(record(VerificationStatus::Pending, 1), SequenceMarker::new(3)));
        assert_eq!(
            cache.get(&addr()).unwrap().status,
            VerificationStatus::Verified
        );
        assert_eq!(cache.applied_marker(&addr()), Some(SequenceMarker::new(9)));
    }

    #[test]
    fn stale_entry_is_invisible_until_resolved() {
        let cache = StatusCache::new();
        cache.apply(record(VerificationStatus::Pending, 1), SequenceMarker::new(1));
        cache.mark_stale(&addr());
        assert!(cache.get(&addr()).is_none());
        assert!(cache.peek(&addr()).is_some());

        cache.store_resolved(record(VerificationStatus::Verified, 2));
        assert_eq!(
            cache.get(&addr()).unwrap().status,
            VerificationStatus::Verified
        );
        // The applied marker survives the resolver pass.
        assert_eq!(cache.applied_marker(&addr()), Some(SequenceMarker::new(1)));
    }

    #[test]
    fn mark_all_stale_hides_every_entry() {
        let cache = StatusCache::new();
        let other = ArtistAddress::parse("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap();
        cache.apply(record(VerificationStatus::Pending, 1), SequenceMarker::new(1));
        cache.apply(
            VerificationRecord::degraded(
                other.clone(),
                VerificationStatus::Verified,
                None,
                Timestamp::new(2),
            ),
            SequenceMarker::new(2),
        );
        cache.mark_all_stale();
        assert!(cache.get(&addr()).is_none());
        assert!(cache.get(&other).is_none());
        assert_eq!(cache.len(), 2);
    }

    proptest! {
        /// For any interleaving of applied markers, the applied marker
        /// never decreases.
        #[test]
        fn applied_marker_is_monotonic(markers in proptest::collection::vec(0u64..100, 1..50)) {
            let cache = StatusCache::new();
            let mut high_water: Option<u64> = None;
            for m in markers {
                cache.apply(record(VerificationStatus::Pending, m), SequenceMarker::new(m));
                let applied = cache.applied_marker(&addr()).unwrap().as_u64();
                if let Some(previous) = high_water {
                    prop_assert!(applied >= previous);
                }
                prop_assert!(applied >= m || high_water.is_some_and(|p| p >= m));
                high_water = Some(applied);
            }
        }
    }
}
