//! WebSocket server implementation.
//!
//! Accepts connections at `/ws` and pushes verification status updates to
//! subscribed clients. Updates arrive on the orchestrator's broadcast
//! channel; each client gets its own forwarder task applying an optional
//! per-artist filter.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::subscriptions::{ClientMessage, ServerMessage};
use atelier_types::{ArtistAddress, VerificationRecord};

#[derive(Debug, Error)]
pub enum WsError {
    #[error("server error: {0}")]
    Server(String),
}

/// Shared state: the status-update broadcast channel.
pub struct WsState {
    pub status_tx: broadcast::Sender<VerificationRecord>,
}

/// The WebSocket server, fed from the orchestrator's update channel.
pub struct WebSocketServer {
    pub port: u16,
    state: Arc<WsState>,
}

impl WebSocketServer {
    pub fn new(port: u16, status_tx: broadcast::Sender<VerificationRecord>) -> Self {
        Self {
            port,
            state: Arc::new(WsState { status_tx }),
        }
    }

    /// Serve until the shutdown signal fires.
    pub async fn start(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), WsError> {
        let state = Arc::clone(&self.state);
        let app = Router::new().route("/ws", get(ws_handler)).with_state(state);

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| WsError::Server(format!("bind {addr}: {e}")))?;
        info!("WebSocket server listening on {addr}");
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .map_err(|e| WsError::Server(e.to_string()))
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

type WsSender = Arc<tokio::sync::Mutex<SplitSink<WebSocket, Message>>>;

async fn send_control(sender: &WsSender, message: &ServerMessage) {
    if let Ok(text) = serde_json::to_string(message) {
        let mut sender = sender.lock().await;
        let _ = sender.send(Message::Text(text)).await;
    }
}

/// Handle a single client connection: process subscribe/unsubscribe/ping
/// messages and run at most one forwarder task for the status feed.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(tokio::sync::Mutex::new(ws_sender));
    let mut forwarder: Option<tokio::task::JoinHandle<()>> = None;

    debug!("new WebSocket client connected");

    while let Some(msg_result) = ws_receiver.next().await {
        let msg = match msg_result {
            Ok(msg) => msg,
            Err(e) => {
                warn!("WebSocket receive error: {e}");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                let client_msg: ClientMessage = match serde_json::from_str(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        send_control(
                            &ws_sender,
                            &ServerMessage::Error {
                                message: format!("invalid message: {e}"),
                            },
                        )
                        .await;
                        continue;
                    }
                };

                match client_msg {
                    ClientMessage::Subscribe { artist } => {
                        let filter = match artist.as_deref().map(ArtistAddress::parse) {
                            Some(Ok(addr)) => Some(addr),
                            Some(Err(e)) => {
                                send_control(
                                    &ws_sender,
                                    &ServerMessage::Error {
                                        message: e.to_string(),
                                    },
                                )
                                .await;
                                continue;
                            }
                            None => None,
                        };

                        if let Some(old) = forwarder.take() {
                            old.abort();
                        }
                        let rx = state.status_tx.subscribe();
                        let sender = Arc::clone(&ws_sender);
                        forwarder = Some(tokio::spawn(forward_updates(rx, sender, filter)));

                        send_control(
                            &ws_sender,
                            &ServerMessage::Ack {
                                action: "subscribe".into(),
                            },
                        )
                        .await;
                    }
                    ClientMessage::Unsubscribe => {
                        let message = if let Some(old) = forwarder.take() {
                            old.abort();
                            ServerMessage::Ack {
                                action: "unsubscribe".into(),
                            }
                        } else {
                            ServerMessage::Error {
                                message: "not subscribed".into(),
                            }
                        };
                        send_control(&ws_sender, &message).await;
                    }
                    ClientMessage::Ping => {
                        send_control(&ws_sender, &ServerMessage::Pong).await;
                    }
                }
            }
            Message::Close(_) => {
                debug!("client sent close frame");
                break;
            }
            Message::Ping(data) => {
                let mut sender = ws_sender.lock().await;
                let _ = sender.send(Message::Pong(data)).await;
            }
            _ => {}
        }
    }

    if let Some(handle) = forwarder.take() {
        handle.abort();
    }
    debug!("WebSocket client disconnected");
}

/// Forwarder task: reads status updates from the broadcast channel and
/// sends matching ones to the client.
async fn forward_updates(
    mut rx: broadcast::Receiver<VerificationRecord>,
    ws_sender: WsSender,
    filter: Option<ArtistAddress>,
) {
    loop {
        match rx.recv().await {
            Ok(record) => {
                if filter.as_ref().is_some_and(|a| a != &record.artist) {
                    continue;
                }
                let Ok(text) = serde_json::to_string(&record) else {
                    continue;
                };
                let mut sender = ws_sender.lock().await;
                if sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("client lagged behind by {n} status updates");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("status channel closed");
                break;
            }
        }
    }
}
