//! relay-protocol: Wire definitions for the relay server
//!
//! Clients and server exchange newline-delimited JSON. This crate defines
//! the request and envelope types and the line codecs for both ends.

pub mod codec;
pub mod messages;

// Re-export main types at crate root
pub use codec::{ClientCodec, CodecError, ServerCodec, DEFAULT_MAX_LINE_LENGTH};
pub use messages::{ClientFrame, ClientRequest, ServerMessage, SERVER_SOURCE};
