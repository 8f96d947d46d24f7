//! Typed wrapper over the artist-verification ledger.
//!
//! The ledger is the single source of truth for verification status. This
//! crate defines the gateway trait the rest of the workspace depends on,
//! the restartable event stream built on top of it, and the JSON-RPC
//! implementation that talks to the contract relay node.

pub mod error;
pub mod gateway;
pub mod rpc_gateway;
pub mod subscription;

pub use error::LedgerError;
pub use gateway::{LedgerGateway, StatusEntry};
pub use rpc_gateway::JsonRpcGateway;
pub use subscription::EventStream;
