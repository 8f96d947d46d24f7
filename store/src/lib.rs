//! Abstract content-addressed storage for the atelier protocol.
//!
//! Every storage backend (HTTP gateway, in-memory for testing) implements
//! [`ContentStore`]. The rest of the codebase depends only on the trait.

pub mod error;

pub use error::StoreError;

use async_trait::async_trait;
use atelier_types::ContentRef;

/// Opaque content-addressed put/get.
///
/// Both operations are pure functions of content: identical payload bytes
/// always yield the same identifier, so re-putting the same payload is a
/// safe no-op at the storage layer. No mutation or delete is exposed.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a payload and return its content-derived identifier.
    async fn put(&self, bytes: &[u8]) -> Result<ContentRef, StoreError>;

    /// Fetch a payload by identifier.
    async fn get(&self, content_ref: &ContentRef) -> Result<Vec<u8>, StoreError>;
}
