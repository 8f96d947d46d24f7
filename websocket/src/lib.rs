//! WebSocket server for real-time verification status updates.
//!
//! Replaces the dashboard's poll loop: clients subscribe once and receive
//! every confirmed status transition as it is observed, whether it came
//! from a relay write or from the ledger event stream.

pub mod server;
pub mod subscriptions;

pub use server::{WebSocketServer, WsError, WsState};
pub use subscriptions::{ClientMessage, ServerMessage};
