//! Fundamental types for the atelier verification protocol.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: artist addresses, content references, profiles, verification
//! records, ledger events, receipts, and timestamps.

pub mod address;
pub mod content;
pub mod error;
pub mod event;
pub mod profile;
pub mod receipt;
pub mod record;
pub mod time;

pub use address::ArtistAddress;
pub use content::ContentRef;
pub use error::ValidationError;
pub use event::{LedgerEvent, LedgerEventKind, SequenceMarker};
pub use profile::{ArtistProfile, SocialLinks};
pub use receipt::{Receipt, ReceiptId};
pub use record::{VerificationRecord, VerificationStatus};
pub use time::Timestamp;
