//! Integration tests exercising the full verification flow:
//! submit → content store + ledger → resolver/cache readback → event
//! reconciliation.
//!
//! These tests wire together components that are normally only connected
//! inside the node, using the nullable collaborators for determinism.

use atelier_ledger::{LedgerError, LedgerGateway};
use atelier_nullables::{NullContentStore, NullLedger};
use atelier_types::{ArtistAddress, ArtistProfile, SocialLinks, VerificationStatus};
use atelier_verification::{
    EventReconciler, StaticAuthorizer, VerificationError, VerificationOrchestrator,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

fn addr(last: char) -> ArtistAddress {
    ArtistAddress::parse(&format!("0x{}{last}", "0".repeat(39))).unwrap()
}

fn admin() -> ArtistAddress {
    addr('f')
}

fn profile(name: &str) -> ArtistProfile {
    ArtistProfile {
        name: name.into(),
        bio: "Paints with light".into(),
        portfolio_url: "https://example.com/portfolio".into(),
        email: "artist@example.com".into(),
        social: SocialLinks::default(),
        art_style: Some("impressionist".into()),
    }
}

struct Harness {
    store: Arc<NullContentStore>,
    ledger: Arc<NullLedger>,
    orchestrator: VerificationOrchestrator,
}

fn harness() -> Harness {
    let store = Arc::new(NullContentStore::new());
    let ledger = Arc::new(NullLedger::new());
    let authz = Arc::new(StaticAuthorizer::new([admin()]));
    let orchestrator = VerificationOrchestrator::new(
        Arc::clone(&store) as Arc<dyn atelier_store::ContentStore>,
        Arc::clone(&ledger) as Arc<dyn LedgerGateway>,
        authz,
    )
    .with_retry_policy(atelier_verification::RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(4),
    });
    Harness {
        store,
        ledger,
        orchestrator,
    }
}

/// Poll `check` until it returns true or the timeout expires.
async fn wait_for<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Duration::from_secs(5);
    let result = tokio::time::timeout(deadline, async {
        loop {
            if check().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(result.is_ok(), "timed out waiting for: {what}");
}

// ── Submission ──────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_returns_pending_record_with_content_hash() {
    let h = harness();
    let artist = addr('a');

    let outcome = h
        .orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();

    assert_eq!(outcome.record.status, VerificationStatus::Pending);
    let expected = NullContentStore::ref_for(&profile("Ada").canonical_bytes());
    assert_eq!(outcome.record.content_ref, Some(expected));

    let verified = h.orchestrator.list_verified().await.unwrap();
    assert!(verified.iter().all(|r| r.artist != artist));
}

#[tokio::test]
async fn byte_identical_resubmission_reuses_the_content_ref() {
    let h = harness();
    let artist = addr('a');

    let first = h
        .orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();
    let second = h
        .orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();

    assert_eq!(first.record.content_ref, second.record.content_ref);
    assert!(second.receipt.marker > first.receipt.marker);
}

#[tokio::test]
async fn submit_retries_transient_ledger_failure_without_duplicates() {
    let h = harness();
    let artist = addr('a');
    h.ledger.fail_next(LedgerError::Unavailable("flaky node".into()));

    let outcome = h
        .orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();
    assert_eq!(outcome.record.status, VerificationStatus::Pending);

    // Exactly one ledger record despite the retried call, and the store
    // was only written once.
    assert_eq!(h.ledger.events_for(&artist).len(), 1);
    assert_eq!(h.store.put_count(), 1);
}

#[tokio::test]
async fn submit_never_retries_a_ledger_rejection() {
    let h = harness();
    let artist = addr('a');
    h.ledger
        .fail_next(LedgerError::Rejected("malformed address".into()));

    let err = h
        .orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap_err();
    assert!(matches!(err, VerificationError::LedgerRejected { .. }));
    assert!(h.ledger.events_for(&artist).is_empty());
}

#[tokio::test]
async fn submit_requires_caller_to_own_the_subject() {
    let h = harness();
    let err = h
        .orchestrator
        .submit(&addr('a'), &addr('b'), profile("Mallory"))
        .await
        .unwrap_err();
    assert!(matches!(err, VerificationError::NotAuthorized { .. }));
    assert_eq!(h.store.put_count(), 0);
}

#[tokio::test]
async fn invalid_profile_is_rejected_before_any_external_call() {
    let h = harness();
    let artist = addr('a');
    let mut bad = profile("Ada");
    bad.email = "not-an-email".into();

    let err = h.orchestrator.submit(&artist, &artist, bad).await.unwrap_err();
    assert!(matches!(err, VerificationError::Validation(_)));
    assert_eq!(h.store.put_count(), 0);
    assert!(h.ledger.events_for(&artist).is_empty());
}

// ── State machine ───────────────────────────────────────────────────────

#[tokio::test]
async fn verify_then_reject_fails_with_ledger_rejected() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();

    h.orchestrator.verify(&admin(), &artist).await.unwrap();
    let record = h.orchestrator.get_status(&artist, true).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Verified);

    let err = h
        .orchestrator
        .reject(&admin(), &artist, None)
        .await
        .unwrap_err();
    assert!(matches!(err, VerificationError::LedgerRejected { .. }));
}

#[tokio::test]
async fn verified_artist_cannot_resubmit() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();
    h.orchestrator.verify(&admin(), &artist).await.unwrap();

    let err = h
        .orchestrator
        .submit(&artist, &artist, profile("Ada v2"))
        .await
        .unwrap_err();
    assert!(matches!(err, VerificationError::LedgerRejected { .. }));
}

#[tokio::test]
async fn rejected_artist_returns_to_pending_on_resubmission() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();
    h.orchestrator
        .reject(&admin(), &artist, Some("portfolio incomplete"))
        .await
        .unwrap();

    let record = h.orchestrator.get_status(&artist, true).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Rejected);

    h.orchestrator
        .submit(&artist, &artist, profile("Ada, revised"))
        .await
        .unwrap();
    let record = h.orchestrator.get_status(&artist, true).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);
}

#[tokio::test]
async fn privileged_calls_require_admin_capability() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();

    let err = h.orchestrator.verify(&artist, &artist).await.unwrap_err();
    assert!(matches!(err, VerificationError::NotAuthorized { .. }));
}

// ── Reads ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn status_read_degrades_when_content_is_missing() {
    let h = harness();
    let artist = addr('a');
    let outcome = h
        .orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();
    h.store.forget(outcome.record.content_ref.as_ref().unwrap());

    let record = h.orchestrator.get_status(&artist, true).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);
    assert!(record.content_ref.is_some());
    assert!(record.profile.is_none());
}

#[tokio::test]
async fn status_read_degrades_when_store_is_down() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();
    h.store.set_unavailable(true);

    let record = h.orchestrator.get_status(&artist, true).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);
    assert!(record.profile.is_none());
}

#[tokio::test]
async fn cache_hit_skips_collaborator_reads() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();

    let gets_before = h.store.get_count();
    let record = h.orchestrator.get_status(&artist, false).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);
    // The submit populated the cache; no store read happened.
    assert_eq!(h.store.get_count(), gets_before);
}

#[tokio::test]
async fn unknown_artist_reads_as_not_found() {
    let h = harness();
    let err = h.orchestrator.get_status(&addr('c'), true).await.unwrap_err();
    assert!(matches!(err, VerificationError::NotFound { .. }));
}

#[tokio::test]
async fn list_verified_returns_enriched_records() {
    let h = harness();
    for last in ['a', 'b'] {
        let artist = addr(last);
        h.orchestrator
            .submit(&artist, &artist, profile(&format!("Artist {last}")))
            .await
            .unwrap();
    }
    h.orchestrator.verify(&admin(), &addr('a')).await.unwrap();

    let verified = h.orchestrator.list_verified().await.unwrap();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].artist, addr('a'));
    assert_eq!(verified[0].status, VerificationStatus::Verified);
    assert!(verified[0].profile.is_some());
}

#[tokio::test]
async fn list_verified_keeps_degraded_members() {
    let h = harness();
    let artist = addr('a');
    let outcome = h
        .orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();
    h.orchestrator.verify(&admin(), &artist).await.unwrap();
    h.store.forget(outcome.record.content_ref.as_ref().unwrap());

    // Force the next list to resolve instead of reusing the cached
    // profile enrichment.
    h.orchestrator.cache().mark_all_stale();

    let verified = h.orchestrator.list_verified().await.unwrap();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].status, VerificationStatus::Verified);
    assert!(verified[0].profile.is_none());
}

// ── Event reconciliation ────────────────────────────────────────────────

fn spawn_reconciler(
    h: &Harness,
) -> (broadcast::Sender<()>, tokio::task::JoinHandle<()>) {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let reconciler = EventReconciler::new(
        Arc::clone(&h.ledger) as Arc<dyn LedgerGateway>,
        h.orchestrator.cache(),
        h.orchestrator.updates(),
    )
    .with_poll_interval(Duration::from_millis(10));
    let handle = reconciler.spawn(shutdown_rx);
    (shutdown_tx, handle)
}

#[tokio::test]
async fn reconciler_applies_external_ledger_writes() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();

    let mut updates = h.orchestrator.subscribe();
    let (shutdown_tx, handle) = spawn_reconciler(&h);

    // An external party verifies directly on the ledger; the reconciler
    // must fold it into the cache without any orchestrator write.
    h.ledger.verify(&artist).await.unwrap();

    wait_for("cache to reflect the external verify", || async {
        h.orchestrator
            .cache()
            .get(&artist)
            .is_some_and(|r| r.status == VerificationStatus::Verified)
    })
    .await;

    // Subscribers saw the transition.
    let mut saw_verified = false;
    while let Ok(record) = updates.try_recv() {
        if record.artist == artist && record.status == VerificationStatus::Verified {
            saw_verified = true;
        }
    }
    assert!(saw_verified);

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("reconciler did not stop promptly")
        .unwrap();
}

#[tokio::test]
async fn redelivered_events_leave_the_cache_unchanged() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();
    h.ledger.verify(&artist).await.unwrap();

    // First delivery.
    let (shutdown_tx, handle) = spawn_reconciler(&h);
    wait_for("first delivery", || async {
        h.orchestrator
            .cache()
            .get(&artist)
            .is_some_and(|r| r.status == VerificationStatus::Verified)
    })
    .await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    let snapshot = h.orchestrator.cache().get(&artist);
    let marker = h.orchestrator.cache().applied_marker(&artist);
    let gets = h.store.get_count();

    // A fresh reconciler starts with no cursor and replays the whole
    // retained history — a full redelivery of every event.
    let (shutdown_tx, handle) = spawn_reconciler(&h);
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    assert_eq!(h.orchestrator.cache().get(&artist), snapshot);
    assert_eq!(h.orchestrator.cache().applied_marker(&artist), marker);
    assert_eq!(h.store.get_count(), gets);
}

#[tokio::test]
async fn stale_event_never_overwrites_a_newer_confirmed_write() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();

    // Optimistic update from the privileged write lands first.
    h.orchestrator.verify(&admin(), &artist).await.unwrap();
    assert_eq!(
        h.orchestrator.cache().get(&artist).unwrap().status,
        VerificationStatus::Verified
    );

    // The reconciler then replays history from the beginning, including
    // the older Submitted event. The marker gate must drop it.
    let (shutdown_tx, handle) = spawn_reconciler(&h);
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    assert_eq!(
        h.orchestrator.cache().get(&artist).unwrap().status,
        VerificationStatus::Verified
    );
}

#[tokio::test]
async fn history_gap_forces_resync_through_the_resolver() {
    let h = harness();
    let artist = addr('a');
    h.orchestrator
        .submit(&artist, &artist, profile("Ada"))
        .await
        .unwrap();

    let (shutdown_tx, handle) = spawn_reconciler(&h);

    // An external verify lands on the ledger; once the cache shows it,
    // the reconciler's cursor has provably advanced past the submit.
    h.ledger.verify(&artist).await.unwrap();
    wait_for("external verify applied", || async {
        h.orchestrator
            .cache()
            .get(&artist)
            .is_some_and(|r| r.status == VerificationStatus::Verified)
    })
    .await;

    // Prune beyond the reconciler's cursor so its next poll sees a gap.
    h.ledger.prune_events_up_to(5);

    wait_for("cache marked stale after gap", || async {
        h.orchestrator.cache().get(&artist).is_none()
    })
    .await;

    // The stale entry forces the next read through the resolver, which
    // sees the post-gap truth.
    let record = h.orchestrator.get_status(&artist, false).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Verified);

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
}
