//! Server-authored notices
//!
//! Text of the join, rename, disconnect and roster messages. All of them
//! go out as `[Server]` envelopes.

use relay_protocol::ServerMessage;

pub fn joined(name: &str) -> ServerMessage {
    ServerMessage::from_server(format!("\"{}\" has entered the chat", name))
}

pub fn renamed(old: &str, new: &str) -> ServerMessage {
    ServerMessage::from_server(format!("\"{}\" renamed to {}", old, new))
}

pub fn disconnected(name: &str) -> ServerMessage {
    ServerMessage::from_server(format!("\"{}\" disconnected", name))
}

/// Roster listing: a header line, then the names as a quoted list
pub fn roster(names: &[String]) -> ServerMessage {
    ServerMessage::from_server(format!("List of users\n\t{:?}", names))
}
