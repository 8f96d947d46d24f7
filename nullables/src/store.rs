//! Nullable content store — thread-safe in-memory storage for testing.

use async_trait::async_trait;
use atelier_store::{ContentStore, StoreError};
use atelier_types::ContentRef;
use blake2::{Blake2s256, Digest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// An in-memory content-addressed store.
///
/// Identifiers are real content hashes (Blake2s over the payload), so the
/// content-addressing invariant holds: identical bytes always map to the
/// same reference. Thread-safe for use with tokio's multi-threaded
/// runtime.
#[derive(Default)]
pub struct NullContentStore {
    contents: Mutex<HashMap<String, Vec<u8>>>,
    unavailable: AtomicBool,
    put_count: AtomicU64,
    get_count: AtomicU64,
}

impl NullContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a transport outage: every call fails with `Unavailable`
    /// until cleared.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Drop a stored payload, simulating content outside its visibility
    /// window (the reference stays valid on the ledger).
    pub fn forget(&self, content_ref: &ContentRef) {
        self.contents.lock().unwrap().remove(content_ref.as_str());
    }

    /// Number of `put` calls observed.
    pub fn put_count(&self) -> u64 {
        self.put_count.load(Ordering::SeqCst)
    }

    /// Number of `get` calls observed.
    pub fn get_count(&self) -> u64 {
        self.get_count.load(Ordering::SeqCst)
    }

    /// The identifier `put` would assign to `bytes`.
    pub fn ref_for(bytes: &[u8]) -> ContentRef {
        ContentRef::new(hex::encode(Blake2s256::digest(bytes)))
    }
}

#[async_trait]
impl ContentStore for NullContentStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentRef, StoreError> {
        self.put_count.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".into()));
        }
        let content_ref = Self::ref_for(bytes);
        self.contents
            .lock()
            .unwrap()
            .insert(content_ref.as_str().to_string(), bytes.to_vec());
        Ok(content_ref)
    }

    async fn get(&self, content_ref: &ContentRef) -> Result<Vec<u8>, StoreError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".into()));
        }
        self.contents
            .lock()
            .unwrap()
            .get(content_ref.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(content_ref.to_string()))
    }
}
