//! JSON-RPC implementation of the ledger gateway.
//!
//! Talks to the contract relay node over HTTP. JSON-RPC error objects map
//! to [`LedgerError::Rejected`] with the node's message verbatim; transport
//! failures map to [`LedgerError::Unavailable`]. A dedicated error code
//! signals a pruned event history and maps to [`LedgerError::GapDetected`].

use crate::gateway::{LedgerGateway, StatusEntry};
use crate::LedgerError;
use async_trait::async_trait;
use atelier_types::{
    ArtistAddress, ContentRef, LedgerEvent, LedgerEventKind, Receipt, ReceiptId,
    SequenceMarker, Timestamp, VerificationStatus,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Error code the node uses for "history before this marker is pruned".
const GAP_ERROR_CODE: i64 = -32010;

/// Default request timeout for ledger calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`LedgerGateway`] speaking JSON-RPC 2.0 to the contract relay node.
pub struct JsonRpcGateway {
    client: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ReceiptWire {
    id: String,
    marker: u64,
    timestamp: u64,
}

#[derive(Deserialize)]
struct StatusWire {
    status: u8,
    #[serde(default)]
    content_ref: String,
    last_updated: u64,
}

#[derive(Deserialize)]
struct EventWire {
    marker: u64,
    timestamp: u64,
    kind: String,
    artist: String,
    #[serde(default)]
    content_ref: String,
}

impl JsonRpcGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "{method} returned {}",
                response.status()
            )));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("bad {method} response: {e}")))?;

        if let Some(err) = body.error {
            return Err(Self::map_rpc_error(err));
        }
        body.result
            .ok_or_else(|| LedgerError::Unavailable(format!("{method} returned no result")))
    }

    fn map_rpc_error(err: RpcErrorObject) -> LedgerError {
        if err.code == GAP_ERROR_CODE {
            let oldest = err
                .data
                .as_ref()
                .and_then(|d| d.get("oldest_retained"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            return LedgerError::GapDetected {
                oldest_retained: SequenceMarker::new(oldest),
            };
        }
        LedgerError::Rejected(err.message)
    }

    fn parse_receipt(wire: ReceiptWire) -> Receipt {
        Receipt {
            id: ReceiptId::new(wire.id),
            marker: SequenceMarker::new(wire.marker),
            timestamp: Timestamp::new(wire.timestamp),
        }
    }

    fn parse_event(wire: EventWire) -> Result<LedgerEvent, LedgerError> {
        let artist = ArtistAddress::parse(&wire.artist)
            .map_err(|e| LedgerError::Unavailable(format!("malformed event artist: {e}")))?;
        let kind = match wire.kind.as_str() {
            "submitted" => LedgerEventKind::Submitted {
                artist,
                content_ref: ContentRef::new(wire.content_ref),
            },
            "verified" => LedgerEventKind::Verified { artist },
            "rejected" => LedgerEventKind::Rejected { artist },
            other => {
                return Err(LedgerError::Unavailable(format!(
                    "unknown event kind: {other}"
                )))
            }
        };
        Ok(LedgerEvent {
            marker: SequenceMarker::new(wire.marker),
            timestamp: Timestamp::new(wire.timestamp),
            kind,
        })
    }
}

#[async_trait]
impl LedgerGateway for JsonRpcGateway {
    async fn submit(
        &self,
        artist: &ArtistAddress,
        content_ref: &ContentRef,
    ) -> Result<Receipt, LedgerError> {
        let wire: ReceiptWire = self
            .call(
                "artist_submitProfile",
                json!([artist.as_str(), content_ref.as_str()]),
            )
            .await?;
        Ok(Self::parse_receipt(wire))
    }

    async fn verify(&self, artist: &ArtistAddress) -> Result<Receipt, LedgerError> {
        let wire: ReceiptWire = self.call("artist_verify", json!([artist.as_str()])).await?;
        Ok(Self::parse_receipt(wire))
    }

    async fn reject(
        &self,
        artist: &ArtistAddress,
        reason: Option<&str>,
    ) -> Result<Receipt, LedgerError> {
        let wire: ReceiptWire = self
            .call("artist_reject", json!([artist.as_str(), reason]))
            .await?;
        Ok(Self::parse_receipt(wire))
    }

    async fn status_of(&self, artist: &ArtistAddress) -> Result<StatusEntry, LedgerError> {
        let wire: StatusWire = self.call("artist_status", json!([artist.as_str()])).await?;
        let status = VerificationStatus::from_ledger_code(wire.status).ok_or_else(|| {
            LedgerError::Unavailable(format!("unknown status code {}", wire.status))
        })?;
        let content_ref = if wire.content_ref.is_empty() {
            None
        } else {
            Some(ContentRef::new(wire.content_ref))
        };
        Ok(StatusEntry {
            status,
            content_ref,
            last_updated: Timestamp::new(wire.last_updated),
        })
    }

    async fn verified_set(&self) -> Result<Vec<ArtistAddress>, LedgerError> {
        let raw: Vec<String> = self.call("artist_verifiedSet", json!([])).await?;
        raw.iter()
            .map(|s| {
                ArtistAddress::parse(s)
                    .map_err(|e| LedgerError::Unavailable(format!("malformed address: {e}")))
            })
            .collect()
    }

    async fn events_since(
        &self,
        after: Option<SequenceMarker>,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        let raw: Vec<EventWire> = self
            .call("artist_eventsSince", json!([after.map(|m| m.as_u64())]))
            .await?;
        raw.into_iter().map(Self::parse_event).collect()
    }
}
