//! Node configuration with TOML file support.

use crate::NodeError;
use atelier_types::ArtistAddress;
use serde::{Deserialize, Serialize};

/// Configuration for an atelier service node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Port for the HTTP relay.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Whether to enable the WebSocket live-status server.
    #[serde(default)]
    pub enable_websocket: bool,

    /// WebSocket port (if enabled).
    #[serde(default = "default_ws_port")]
    pub websocket_port: u16,

    /// JSON-RPC endpoint of the ledger contract relay node.
    #[serde(default = "default_ledger_rpc_url")]
    pub ledger_rpc_url: String,

    /// Base URL of the content-store HTTP gateway.
    #[serde(default = "default_content_store_url")]
    pub content_store_url: String,

    /// Bearer token for the content-store gateway.
    #[serde(default)]
    pub content_store_token: Option<String>,

    /// Addresses holding the verify/reject capability.
    #[serde(default)]
    pub admin_addresses: Vec<String>,

    /// Interval between ledger event polls, in seconds.
    #[serde(default = "default_event_poll_interval_secs")]
    pub event_poll_interval_secs: u64,

    /// Maximum attempts for retryable collaborator calls.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_rpc_port() -> u16 {
    3000
}

fn default_ws_port() -> u16 {
    3001
}

fn default_ledger_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_content_store_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

fn default_event_poll_interval_secs() -> u64 {
    2
}

fn default_retry_max_attempts() -> u32 {
    4
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_port: default_rpc_port(),
            enable_websocket: false,
            websocket_port: default_ws_port(),
            ledger_rpc_url: default_ledger_rpc_url(),
            content_store_url: default_content_store_url(),
            content_store_token: None,
            admin_addresses: Vec::new(),
            event_poll_interval_secs: default_event_poll_interval_secs(),
            retry_max_attempts: default_retry_max_attempts(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Parse and validate the configured admin addresses.
    pub fn admin_set(&self) -> Result<Vec<ArtistAddress>, NodeError> {
        self.admin_addresses
            .iter()
            .map(|raw| {
                ArtistAddress::parse(raw)
                    .map_err(|e| NodeError::Config(format!("admin address: {e}")))
            })
            .collect()
    }
}
