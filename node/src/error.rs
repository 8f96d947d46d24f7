//! Node error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),
}

impl From<atelier_rpc::RpcError> for NodeError {
    fn from(e: atelier_rpc::RpcError) -> Self {
        NodeError::Server(e.to_string())
    }
}

impl From<atelier_websocket::WsError> for NodeError {
    fn from(e: atelier_websocket::WsError) -> Self {
        NodeError::Server(e.to_string())
    }
}
