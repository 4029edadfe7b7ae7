//! Client-server message types
//!
//! Client requests are decoded leniently: every line maps to some
//! [`ClientRequest`], with anything the server does not understand landing in
//! [`ClientRequest::Unknown`]. Server frames always use the `message`
//! envelope.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Source name used for notices authored by the server itself
pub const SERVER_SOURCE: &str = "[Server]";

/// Request sent from client to server, keyed by its `type` tag
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    /// Chat message to relay to every other session
    Message { data: String },

    /// Change the sender's display name
    SetName { name: String },

    /// Replay the cached history to the sender
    History,

    /// List the display names of all connected sessions
    Users,

    /// Anything else, kept verbatim for diagnostics
    Unknown(Value),
}

impl ClientRequest {
    /// Decode one line of client input
    ///
    /// Never fails. Lines that are not JSON are wrapped as
    /// `{"raw_message": <line>}`; objects with a missing or unrecognized
    /// `type`, or a `message`/`set-name` without string `data`, become
    /// [`ClientRequest::Unknown`].
    pub fn decode(line: &str) -> Self {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(_) => return Self::Unknown(json!({ "raw_message": line })),
        };

        let tag = value.get("type").and_then(Value::as_str);
        let data = value.get("data").and_then(Value::as_str);

        match (tag, data) {
            (Some("message"), Some(data)) => Self::Message {
                data: data.to_string(),
            },
            (Some("set-name"), Some(name)) => Self::SetName {
                name: name.to_string(),
            },
            (Some("history"), _) => Self::History,
            (Some("users"), _) => Self::Users,
            _ => Self::Unknown(value),
        }
    }

    /// Wire tag of this request, if it has one
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Message { .. } => Some("message"),
            Self::SetName { .. } => Some("set-name"),
            Self::History => Some("history"),
            Self::Users => Some("users"),
            Self::Unknown(value) => value.get("type").and_then(Value::as_str),
        }
    }

    /// Encode back into the JSON object a client would send
    pub fn to_value(&self) -> Value {
        match self {
            Self::Message { data } => json!({ "type": "message", "data": data }),
            Self::SetName { name } => json!({ "type": "set-name", "data": name }),
            Self::History => json!({ "type": "history" }),
            Self::Users => json!({ "type": "users" }),
            Self::Unknown(value) => value.clone(),
        }
    }
}

/// Frame sent from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Chat content, either relayed from a session or authored by the server
    Message { source: String, message: String },
}

impl ServerMessage {
    /// Envelope for a notice authored by the server
    pub fn from_server(message: impl Into<String>) -> Self {
        Self::Message {
            source: SERVER_SOURCE.to_string(),
            message: message.into(),
        }
    }

    /// Envelope for content relayed on behalf of a session
    pub fn from_session(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Message {
            source: source.into(),
            message: message.into(),
        }
    }

    /// Serialize to a single wire line (without the delimiter)
    pub fn to_line(&self) -> String {
        let Self::Message { source, message } = self;
        json!({
            "type": "message",
            "data": { "source": source, "message": message },
        })
        .to_string()
    }

    pub fn source(&self) -> &str {
        match self {
            Self::Message { source, .. } => source,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Message { message, .. } => message,
        }
    }
}

/// One decoded inbound line
#[derive(Debug, Clone, PartialEq)]
pub enum ClientFrame {
    /// A request to dispatch
    Request(ClientRequest),
    /// A blank line; the client is done
    Hangup,
}
