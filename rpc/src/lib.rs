//! HTTP relay for the atelier verification service.
//!
//! Provides endpoints for:
//! - Profile submission
//! - Privileged verify / reject
//! - Status queries (single artist + verified list)
//!
//! The relay holds no verification logic of its own; every route is a thin
//! typed layer over the orchestrator.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, RpcServer};
