//! Wire protocol for Vellum collaboration sessions.
//!
//! Every message is one UTF-8 text frame holding a JSON object with a
//! `type` discriminant. Field names are camelCase; discriminants are
//! snake_case. Optional fields may be omitted; unknown fields are ignored;
//! unknown discriminants are reported as [`Decoded::Ignored`] so the
//! server can drop them silently while real schema violations surface as
//! [`ProtocolError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vellum_model::{Operation, Position};

/// Errors produced while decoding inbound frames.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Not JSON, not an object, or no string `type` discriminant.
    #[error("invalid message format")]
    Invalid,

    /// Known discriminant but the payload does not match its schema.
    #[error("malformed {kind} message: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A participant as presented to other clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
    pub display_name: String,
    pub color: String,
}

/// Messages a client sends to the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Join a document's room. Must be the first meaningful message on a
    /// connection; joining again implicitly leaves the previous room.
    Join { document_id: String },

    /// An edit against the client's last acknowledged version.
    Operation {
        document_id: String,
        client_id: String,
        version: u64,
        operation: Operation,
    },

    /// Ephemeral caret/selection state. `anchor` was added in a later
    /// protocol revision and defaults to null when absent.
    Cursor {
        document_id: String,
        cursor: Option<Position>,
        #[serde(default)]
        anchor: Option<Position>,
    },
}

/// Messages the server sends to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Reply to a successful join.
    Joined {
        document_id: String,
        version: u64,
        users: Vec<Participant>,
    },

    /// A sequenced operation from another participant, already transformed
    /// against everything it was concurrent with.
    Operation {
        document_id: String,
        client_id: String,
        user_id: String,
        version: u64,
        operation: Operation,
    },

    /// Acknowledges the sender's own operation at its assigned version.
    Ack { document_id: String, version: u64 },

    UserJoined {
        document_id: String,
        user_id: String,
        display_name: String,
        color: String,
    },

    UserLeft {
        document_id: String,
        user_id: String,
    },

    Cursor {
        document_id: String,
        user_id: String,
        display_name: String,
        color: String,
        cursor: Option<Position>,
        #[serde(default)]
        anchor: Option<Position>,
    },

    Error { message: String },
}

/// Outcome of decoding one inbound text frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
    Message(ClientMessage),
    /// Well-formed JSON with an unrecognized discriminant; dropped
    /// without an error reply.
    Ignored,
}

/// Decode one client frame.
pub fn decode_client(frame: &str) -> Result<Decoded, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(frame).map_err(|_| ProtocolError::Invalid)?;
    let Some(kind) = value.get("type").and_then(|t| t.as_str()) else {
        return Err(ProtocolError::Invalid);
    };
    match kind {
        "join" | "operation" | "cursor" => {
            let kind = kind.to_string();
            serde_json::from_value(value)
                .map(Decoded::Message)
                .map_err(|source| ProtocolError::Malformed { kind, source })
        }
        _ => Ok(Decoded::Ignored),
    }
}

/// Encode one server frame.
pub fn encode_server(message: &ServerMessage) -> String {
    // These types serialize infallibly; an error here would be a serde
    // bug, so degrade to a protocol-level error frame instead of panicking.
    serde_json::to_string(message)
        .unwrap_or_else(|_| r#"{"type":"error","message":"encoding failure"}"#.into())
}
