//! Verification orchestrator — coordinates the content store and the
//! ledger into a single submit/verify/reject/read workflow.

use crate::authorization::{AuthorizationPort, WriteAction};
use crate::cache::StatusCache;
use crate::error::{Op, VerificationError};
use crate::resolver::StatusResolver;
use crate::retry::RetryPolicy;
use atelier_ledger::LedgerGateway;
use atelier_store::ContentStore;
use atelier_types::{
    ArtistAddress, ArtistProfile, Receipt, VerificationRecord, VerificationStatus,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Capacity of the status-update broadcast channel.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Result of a successful submission.
#[derive(Clone, Debug)]
pub struct SubmitOutcome {
    pub record: VerificationRecord,
    pub receipt: Receipt,
}

/// Top-level component of the verification core.
///
/// Writes go content-store-first: the profile payload is stored, then its
/// reference is committed on the ledger. If the ledger call fails after a
/// successful store write, the reference is orphaned but no ledger state
/// changed — a retry with the same payload reuses the identical content
/// identifier, so no compensating action is needed.
///
/// State-changing calls for a single artist are serialized behind a
/// per-artist mutex; reads are served from lock-free cache snapshots.
pub struct VerificationOrchestrator {
    store: Arc<dyn ContentStore>,
    gateway: Arc<dyn LedgerGateway>,
    authz: Arc<dyn AuthorizationPort>,
    resolver: StatusResolver,
    cache: Arc<StatusCache>,
    retry: RetryPolicy,
    updates: broadcast::Sender<VerificationRecord>,
    write_locks: Mutex<HashMap<ArtistAddress, Arc<tokio::sync::Mutex<()>>>>,
}

impl VerificationOrchestrator {
    pub fn new(
        store: Arc<dyn ContentStore>,
        gateway: Arc<dyn LedgerGateway>,
        authz: Arc<dyn AuthorizationPort>,
    ) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            resolver: StatusResolver::new(Arc::clone(&gateway), Arc::clone(&store)),
            store,
            gateway,
            authz,
            cache: Arc::new(StatusCache::new()),
            retry: RetryPolicy::default(),
            updates,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The cache shared with the event reconciler.
    pub fn cache(&self) -> Arc<StatusCache> {
        Arc::clone(&self.cache)
    }

    /// The update channel shared with the event reconciler.
    pub fn updates(&self) -> broadcast::Sender<VerificationRecord> {
        self.updates.clone()
    }

    /// Subscribe to confirmed status updates (optimistic writes and
    /// reconciled events alike).
    pub fn subscribe(&self) -> broadcast::Receiver<VerificationRecord> {
        self.updates.subscribe()
    }

    /// Submit a profile for verification.
    ///
    /// Validates, authorizes, stores the payload, then commits the
    /// reference on the ledger. Returns the pending record and the ledger
    /// receipt.
    pub async fn submit(
        &self,
        caller: &ArtistAddress,
        artist: &ArtistAddress,
        profile: ArtistProfile,
    ) -> Result<SubmitOutcome, VerificationError> {
        profile.validate()?;
        self.authorize(caller, artist, WriteAction::Submit, Op::Submit)
            .await?;

        let lock = self.write_lock(artist);
        let _guard = lock.lock().await;

        if let Some(VerificationStatus::Verified) = self.current_status(artist).await? {
            return Err(VerificationError::LedgerRejected {
                op: Op::Submit,
                reason: format!("{artist} is already verified"),
            });
        }

        let bytes = profile.canonical_bytes();
        let content_ref = self
            .retry
            .run("content_store.put", || self.store.put(&bytes))
            .await
            .map_err(|e| VerificationError::from_store(Op::Submit, e))?;

        let receipt = self
            .retry
            .run("ledger.submit", || self.gateway.submit(artist, &content_ref))
            .await
            .map_err(|e| VerificationError::from_ledger(Op::Submit, e))?;

        tracing::info!(%artist, %content_ref, receipt = %receipt.id, "profile submitted");

        let record = VerificationRecord {
            artist: artist.clone(),
            status: VerificationStatus::Pending,
            content_ref: Some(content_ref),
            last_updated: receipt.timestamp,
            profile: Some(profile),
        };
        self.apply_confirmed(record.clone(), &receipt);

        Ok(SubmitOutcome { record, receipt })
    }

    /// Mark an artist as verified. Privileged.
    pub async fn verify(
        &self,
        caller: &ArtistAddress,
        artist: &ArtistAddress,
    ) -> Result<Receipt, VerificationError> {
        self.authorize(caller, artist, WriteAction::Verify, Op::Verify)
            .await?;

        let lock = self.write_lock(artist);
        let _guard = lock.lock().await;
        self.ensure_pending(artist, Op::Verify).await?;

        let receipt = self
            .retry
            .run("ledger.verify", || self.gateway.verify(artist))
            .await
            .map_err(|e| VerificationError::from_ledger(Op::Verify, e))?;

        tracing::info!(%artist, receipt = %receipt.id, "artist verified");
        self.apply_transition(artist, VerificationStatus::Verified, &receipt);
        Ok(receipt)
    }

    /// Mark an artist as rejected. Privileged.
    pub async fn reject(
        &self,
        caller: &ArtistAddress,
        artist: &ArtistAddress,
        reason: Option<&str>,
    ) -> Result<Receipt, VerificationError> {
        self.authorize(caller, artist, WriteAction::Reject, Op::Reject)
            .await?;

        let lock = self.write_lock(artist);
        let _guard = lock.lock().await;
        self.ensure_pending(artist, Op::Reject).await?;

        let receipt = self
            .retry
            .run("ledger.reject", || self.gateway.reject(artist, reason))
            .await
            .map_err(|e| VerificationError::from_ledger(Op::Reject, e))?;

        tracing::info!(%artist, receipt = %receipt.id, reason, "artist rejected");
        self.apply_transition(artist, VerificationStatus::Rejected, &receipt);
        Ok(receipt)
    }

    /// Current record for an artist.
    ///
    /// A fresh cache entry is returned immediately; a miss, a stale entry,
    /// or `refresh = true` goes through the resolver and repopulates the
    /// cache.
    pub async fn get_status(
        &self,
        artist: &ArtistAddress,
        refresh: bool,
    ) -> Result<VerificationRecord, VerificationError> {
        if !refresh {
            if let Some(record) = self.cache.get(artist) {
                return Ok(record);
            }
        }
        let record = self.resolver.resolve(artist).await?;
        self.cache.store_resolved(record.clone());
        Ok(record)
    }

    /// All currently verified artists, with best-effort enrichment.
    ///
    /// One member's resolution failure never fails the whole list: the
    /// member is returned as a degraded record instead.
    pub async fn list_verified(&self) -> Result<Vec<VerificationRecord>, VerificationError> {
        let members = self
            .retry
            .run("ledger.verified_set", || self.gateway.verified_set())
            .await
            .map_err(|e| VerificationError::from_ledger(Op::ListVerified, e))?;

        let mut records = Vec::with_capacity(members.len());
        for artist in members {
            if let Some(record) = self.cache.get(&artist) {
                if record.status == VerificationStatus::Verified {
                    records.push(record);
                    continue;
                }
            }
            match self.resolver.resolve(&artist).await {
                Ok(record) => {
                    self.cache.store_resolved(record.clone());
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(%artist, error = %e, "degraded entry in verified list");
                    records.push(VerificationRecord::degraded(
                        artist,
                        VerificationStatus::Verified,
                        None,
                        atelier_types::Timestamp::EPOCH,
                    ));
                }
            }
        }
        Ok(records)
    }

    // ── Internals ──────────────────────────────────────────────────────

    async fn authorize(
        &self,
        caller: &ArtistAddress,
        artist: &ArtistAddress,
        action: WriteAction,
        op: Op,
    ) -> Result<(), VerificationError> {
        if self.authz.can_write(caller, artist, action).await {
            Ok(())
        } else {
            Err(VerificationError::NotAuthorized {
                op,
                caller: caller.clone(),
                artist: artist.clone(),
            })
        }
    }

    /// The per-artist write lock, created on first use.
    fn write_lock(&self, artist: &ArtistAddress) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap();
        Arc::clone(locks.entry(artist.clone()).or_default())
    }

    /// Status as currently known, preferring the cache. `None` means the
    /// ledger has never seen the subject.
    async fn current_status(
        &self,
        artist: &ArtistAddress,
    ) -> Result<Option<VerificationStatus>, VerificationError> {
        if let Some(record) = self.cache.get(artist) {
            return Ok(Some(record.status));
        }
        match self.resolver.resolve(artist).await {
            Ok(record) => {
                self.cache.store_resolved(record.clone());
                Ok(Some(record.status))
            }
            Err(VerificationError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Privileged transitions are only valid from `Pending`; refuse the
    /// rest here rather than burning a ledger call that would be rejected.
    async fn ensure_pending(
        &self,
        artist: &ArtistAddress,
        op: Op,
    ) -> Result<(), VerificationError> {
        match self.current_status(artist).await? {
            Some(VerificationStatus::Pending) => Ok(()),
            Some(status) => Err(VerificationError::LedgerRejected {
                op,
                reason: format!("{artist} is {status}, not pending"),
            }),
            None => Err(VerificationError::NotFound {
                op,
                what: format!("no submission for {artist}"),
            }),
        }
    }

    /// Optimistic cache update after a confirmed privileged write,
    /// carrying over the cached content reference and profile.
    fn apply_transition(&self, artist: &ArtistAddress, status: VerificationStatus, receipt: &Receipt) {
        let prior = self.cache.peek(artist);
        let record = VerificationRecord {
            artist: artist.clone(),
            status,
            content_ref: prior.as_ref().and_then(|r| r.content_ref.clone()),
            last_updated: receipt.timestamp,
            profile: prior.and_then(|r| r.profile),
        };
        self.apply_confirmed(record, receipt);
    }

    /// Marker-gated cache write plus subscriber notification. Uses the
    /// same comparison as the event reconciler, so whichever of the two
    /// observes a transition first wins and the other becomes a no-op.
    fn apply_confirmed(&self, record: VerificationRecord, receipt: &Receipt) {
        if self.cache.apply(record.clone(), receipt.marker) {
            let _ = self.updates.send(record);
        }
    }
}
