//! Background task keeping the cache consistent with the ledger event
//! stream.

use crate::cache::StatusCache;
use atelier_ledger::{EventStream, LedgerError, LedgerGateway};
use atelier_types::{LedgerEvent, LedgerEventKind, VerificationRecord, VerificationStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Consumes the ledger event stream, deduplicates by sequence marker, and
/// pushes confirmed transitions into the shared cache and update channel.
///
/// One reconciler task runs per orchestrator instance. Redelivered events
/// are dropped by the cache's marker comparison; a history gap marks every
/// cached entry stale so the next read goes through the resolver.
pub struct EventReconciler {
    gateway: Arc<dyn LedgerGateway>,
    cache: Arc<StatusCache>,
    updates: broadcast::Sender<VerificationRecord>,
    poll_interval: Duration,
}

impl EventReconciler {
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        cache: Arc<StatusCache>,
        updates: broadcast::Sender<VerificationRecord>,
    ) -> Self {
        Self {
            gateway,
            cache,
            updates,
            poll_interval: atelier_ledger::subscription::DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Spawn the reconciler loop. It runs until `shutdown` fires; the
    /// stream is dropped on every exit path.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut stream =
            EventStream::new(Arc::clone(&self.gateway), None).with_poll_interval(self.poll_interval);
        tracing::info!("event reconciler started");
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("event reconciler stopping");
                    break;
                }
                next = stream.next() => match next {
                    Ok(event) => self.apply(event),
                    Err(LedgerError::GapDetected { oldest_retained }) => {
                        tracing::warn!(
                            %oldest_retained,
                            "event history gap, marking cache stale for resync"
                        );
                        self.cache.mark_all_stale();
                    }
                    Err(e) => {
                        // EventStream retries transient failures internally.
                        tracing::warn!(error = %e, "unexpected event stream error");
                    }
                }
            }
        }
    }

    fn apply(&self, event: LedgerEvent) {
        let artist = event.artist().clone();
        let record = match &event.kind {
            LedgerEventKind::Submitted { content_ref, .. } => VerificationRecord {
                artist: artist.clone(),
                status: VerificationStatus::Pending,
                content_ref: Some(content_ref.clone()),
                last_updated: event.timestamp,
                // A new submission supersedes any cached payload;
                // enrichment happens on the next resolver pass.
                profile: None,
            },
            LedgerEventKind::Verified { .. } | LedgerEventKind::Rejected { .. } => {
                let prior = self.cache.peek(&artist);
                VerificationRecord {
                    artist: artist.clone(),
                    status: event.status(),
                    content_ref: prior.as_ref().and_then(|r| r.content_ref.clone()),
                    last_updated: event.timestamp,
                    profile: prior.and_then(|r| r.profile),
                }
            }
        };

        if self.cache.apply(record.clone(), event.marker) {
            tracing::debug!(%artist, status = %record.status, marker = %event.marker, "event applied");
            let _ = self.updates.send(record);
        } else {
            tracing::debug!(%artist, marker = %event.marker, "duplicate event dropped");
        }
    }
}
