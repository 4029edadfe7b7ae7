//! Message codec for newline-delimited JSON framing

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::messages::{ClientFrame, ClientRequest, ServerMessage};

/// Default maximum line length (64 KiB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Protocol codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line too long (max {max} bytes)")]
    LineTooLong { max: usize },

    #[error("Malformed server frame: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    fn from_lines(err: LinesCodecError, max: usize) -> Self {
        match err {
            LinesCodecError::Io(e) => Self::Io(e),
            LinesCodecError::MaxLineLengthExceeded => Self::LineTooLong { max },
        }
    }
}

/// Codec for ClientRequest (encoding) and ServerMessage (decoding)
/// Used by the client side
pub struct ClientCodec {
    lines: LinesCodec,
    max_length: usize,
}

impl ClientCodec {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_length),
            max_length,
        }
    }
}

impl Default for ClientCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ClientCodec {
    type Item = ServerMessage;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.lines.decode(src) {
            Ok(Some(line)) => Ok(Some(serde_json::from_str(&line)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(CodecError::from_lines(e, self.max_length)),
        }
    }
}

impl Encoder<ClientRequest> for ClientCodec {
    type Error = CodecError;

    fn encode(&mut self, item: ClientRequest, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.lines
            .encode(item.to_value().to_string(), dst)
            .map_err(|e| CodecError::from_lines(e, self.max_length))
    }
}

/// Codec for ServerMessage (encoding) and ClientFrame (decoding)
/// Used by the server side
///
/// Decoding never fails on content: any line becomes a [`ClientFrame`].
/// Only transport errors and over-long lines are reported.
pub struct ServerCodec {
    lines: LinesCodec,
    max_length: usize,
}

impl ServerCodec {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_length),
            max_length,
        }
    }

    fn frame(line: String) -> ClientFrame {
        let line = line.trim();
        if line.is_empty() {
            ClientFrame::Hangup
        } else {
            ClientFrame::Request(ClientRequest::decode(line))
        }
    }
}

impl Default for ServerCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ServerCodec {
    type Item = ClientFrame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.lines
            .decode(src)
            .map(|line| line.map(Self::frame))
            .map_err(|e| CodecError::from_lines(e, self.max_length))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.lines
            .decode_eof(src)
            .map(|line| line.map(Self::frame))
            .map_err(|e| CodecError::from_lines(e, self.max_length))
    }
}

/// Pre-serialized lines, as stored in history
impl Encoder<String> for ServerCodec {
    type Error = CodecError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.lines
            .encode(item, dst)
            .map_err(|e| CodecError::from_lines(e, self.max_length))
    }
}

impl Encoder<ServerMessage> for ServerCodec {
    type Error = CodecError;

    fn encode(&mut self, item: ServerMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<String>::encode(self, item.to_line(), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BufMut;

    #[test]
    fn test_server_decodes_request() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::from(&b"{\"type\":\"message\",\"data\":\"hi\"}\n"[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(
            frame,
            ClientFrame::Request(ClientRequest::Message { data: "hi".into() })
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_blank_line_is_hangup() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::from(&b"\n   \r\n"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(ClientFrame::Hangup));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(ClientFrame::Hangup));
    }

    #[test]
    fn test_partial_line() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::from(&b"{\"type\":\"us"[..]);

        // Should return None for partial line
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.put_slice(b"ers\"}\r\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(ClientFrame::Request(ClientRequest::Users))
        );
    }

    #[test]
    fn test_unterminated_line_at_eof() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::from(&b"{\"type\":\"history\"}"[..]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(
            codec.decode_eof(&mut buf).unwrap(),
            Some(ClientFrame::Request(ClientRequest::History))
        );
    }

    #[test]
    fn test_garbage_is_unknown_request() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::from(&b"not json at all\n"[..]);

        match codec.decode(&mut buf).unwrap() {
            Some(ClientFrame::Request(ClientRequest::Unknown(value))) => {
                assert_eq!(value["raw_message"], "not json at all");
            }
            other => panic!("Expected unknown request, got {:?}", other),
        }
    }

    #[test]
    fn test_line_too_long() {
        let mut codec = ServerCodec::with_max_length(8);
        let mut buf = BytesMut::from(&b"0123456789abcdef\n"[..]);

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(CodecError::LineTooLong { max: 8 })));
    }

    #[test]
    fn test_server_encodes_envelope_line() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode(ServerMessage::from_server("hello"), &mut buf)
            .unwrap();

        assert_eq!(buf.last(), Some(&b'\n'));

        let mut client = ClientCodec::new();
        let decoded = client.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, ServerMessage::from_server("hello"));
    }

    #[test]
    fn test_client_rejects_malformed_server_frame() {
        let mut client = ClientCodec::new();
        let mut buf = BytesMut::from(&b"{\"type\":\"pong\"}\n"[..]);

        assert!(matches!(client.decode(&mut buf), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_client_encodes_request() {
        let mut client = ClientCodec::new();
        let mut server = ServerCodec::new();
        let mut buf = BytesMut::new();

        client
            .encode(ClientRequest::SetName { name: "alice".into() }, &mut buf)
            .unwrap();

        assert_eq!(
            server.decode(&mut buf).unwrap(),
            Some(ClientFrame::Request(ClientRequest::SetName {
                name: "alice".into()
            }))
        );
    }
}
