//! Atelier daemon — entry point for running the verification service.

use atelier_node::{AtelierNode, NodeConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "atelier-daemon", about = "Artist verification service daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "ATELIER_CONFIG")]
    config: Option<PathBuf>,

    /// Port for the HTTP relay.
    #[arg(long, env = "ATELIER_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Enable the WebSocket live-status server.
    #[arg(long, env = "ATELIER_ENABLE_WEBSOCKET")]
    websocket: bool,

    /// WebSocket server port.
    #[arg(long, env = "ATELIER_WS_PORT")]
    websocket_port: Option<u16>,

    /// JSON-RPC endpoint of the ledger contract relay node.
    #[arg(long, env = "ATELIER_LEDGER_RPC_URL")]
    ledger_rpc_url: Option<String>,

    /// Base URL of the content-store HTTP gateway.
    #[arg(long, env = "ATELIER_CONTENT_STORE_URL")]
    content_store_url: Option<String>,

    /// Bearer token for the content-store gateway.
    #[arg(long, env = "ATELIER_CONTENT_STORE_TOKEN")]
    content_store_token: Option<String>,

    /// Admin addresses (comma-separated) holding verify/reject capability.
    #[arg(long, env = "ATELIER_ADMIN_ADDRESSES", value_delimiter = ',')]
    admin_addresses: Vec<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ATELIER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ATELIER_LOG_FORMAT")]
    log_format: Option<String>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(
                path.to_str()
                    .ok_or_else(|| anyhow::anyhow!("config path is not valid UTF-8"))?,
            )?,
            None => NodeConfig::default(),
        };

        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if self.websocket {
            config.enable_websocket = true;
        }
        if let Some(port) = self.websocket_port {
            config.websocket_port = port;
        }
        if let Some(url) = self.ledger_rpc_url {
            config.ledger_rpc_url = url;
        }
        if let Some(url) = self.content_store_url {
            config.content_store_url = url;
        }
        if self.content_store_token.is_some() {
            config.content_store_token = self.content_store_token;
        }
        if !self.admin_addresses.is_empty() {
            config.admin_addresses = self.admin_addresses;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    atelier_utils::init_tracing(&config.log_level, &config.log_format);

    let mut node = AtelierNode::new(config)?;
    node.start()?;

    node.wait_for_signal().await;
    tracing::info!("shutdown signal received, stopping node");
    node.stop().await;

    tracing::info!("atelier daemon exited cleanly");
    Ok(())
}
