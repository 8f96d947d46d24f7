//! Nullable infrastructure for deterministic testing.
//!
//! The verification core's external collaborators (content store, ledger)
//! are abstracted behind traits. This crate provides test-friendly
//! implementations that return deterministic values, can be controlled
//! programmatically (outages, injected failures, history pruning), and
//! never touch the filesystem or network.
//!
//! Usage: swap real implementations for nullables in tests.

pub mod ledger;
pub mod store;

pub use ledger::NullLedger;
pub use store::NullContentStore;
