//! Builds full verification records from a ledger read plus a best-effort
//! content lookup.

use crate::error::{Op, VerificationError};
use atelier_ledger::LedgerGateway;
use atelier_store::ContentStore;
use atelier_types::{ArtistAddress, ArtistProfile, ContentRef, VerificationRecord};
use std::sync::Arc;

/// Combines the authoritative ledger status with profile enrichment from
/// the content store.
///
/// The ledger and the store are never written atomically, so a content
/// reference can legitimately precede or outlive the content's visibility
/// window. Status is therefore always returned when the ledger answers;
/// a missing or unreadable payload degrades to `profile = None` instead of
/// failing the call.
pub struct StatusResolver {
    gateway: Arc<dyn LedgerGateway>,
    store: Arc<dyn ContentStore>,
}

impl StatusResolver {
    pub fn new(gateway: Arc<dyn LedgerGateway>, store: Arc<dyn ContentStore>) -> Self {
        Self { gateway, store }
    }

    /// Resolve the current record for `artist`.
    ///
    /// Fails with [`VerificationError::NotFound`] when the ledger has
    /// never seen the subject, and with a ledger error when the
    /// authoritative read itself fails.
    pub async fn resolve(
        &self,
        artist: &ArtistAddress,
    ) -> Result<VerificationRecord, VerificationError> {
        let entry = self
            .gateway
            .status_of(artist)
            .await
            .map_err(|e| VerificationError::from_ledger(Op::Resolve, e))?;

        if entry.is_unknown_subject() {
            return Err(VerificationError::NotFound {
                op: Op::Resolve,
                what: artist.to_string(),
            });
        }

        let profile = match &entry.content_ref {
            Some(content_ref) => self.fetch_profile(artist, content_ref).await,
            None => None,
        };

        Ok(VerificationRecord {
            artist: artist.clone(),
            status: entry.status,
            content_ref: entry.content_ref,
            last_updated: entry.last_updated,
            profile,
        })
    }

    async fn fetch_profile(
        &self,
        artist: &ArtistAddress,
        content_ref: &ContentRef,
    ) -> Option<ArtistProfile> {
        let bytes = match self.store.get(content_ref).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%artist, %content_ref, error = %e, "profile content unavailable");
                return None;
            }
        };
        match ArtistProfile::from_bytes(&bytes) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(%artist, %content_ref, error = %e, "profile payload unreadable");
                None
            }
        }
    }
}
