//! Client/server message types for the live-status feed.

use serde::{Deserialize, Serialize};

/// A message from a connected client.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start receiving status updates, optionally only for one artist.
    Subscribe {
        #[serde(default)]
        artist: Option<String>,
    },
    /// Stop receiving updates.
    Unsubscribe,
    Ping,
}

/// A control message to a client (status updates are sent as serialized
/// verification records).
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Ack { action: String },
    Error { message: String },
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_parses_with_and_without_filter() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"subscribe","artist":"0xabc"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { artist: Some(a) } if a == "0xabc"));

        let msg: ClientMessage = serde_json::from_str(r#"{"action":"subscribe"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { artist: None }));
    }

    #[test]
    fn server_messages_are_tagged() {
        let json = serde_json::to_value(ServerMessage::Ack {
            action: "subscribe".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "ack");
    }
}
