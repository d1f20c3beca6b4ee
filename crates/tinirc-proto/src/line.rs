//! Line-based codec for tokio.
//!
//! Accumulates raw transport bytes and yields complete newline-terminated
//! lines with the terminator stripped, accepting both `"\r\n"` and bare
//! `"\n"`. Partial lines stay buffered until more bytes arrive.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};
use crate::message::Message;

/// Default maximum line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

/// Newline-terminated line codec.
///
/// Buffer growth is capped: a line longer than `max_len` - terminated or
/// still partial - is a [`ProtocolError::MessageTooLong`], which is fatal to
/// the connection (a misbehaving peer cannot be resynced mid-line).
pub struct LineCodec {
    /// Index of next byte to check for a newline.
    next_index: usize,
    /// Maximum line length.
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default line length cap.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom line length cap.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        // Look for a newline starting from where the previous scan stopped
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            // Strip the terminator, preferring "\r\n" over bare "\n"
            let end = if line.len() >= 2 && line[line.len() - 2] == b'\r' {
                line.len() - 2
            } else {
                line.len() - 1
            };

            let data = String::from_utf8(line[..end].to_vec())?;
            Ok(Some(data))
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            // A partial line already past the cap will never become valid
            if src.len() > self.max_len {
                return Err(ProtocolError::MessageTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<Message> for LineCodec {
    type Error = ProtocolError;

    /// Reply lines are always `"\r\n"`-terminated on the wire.
    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(msg.to_string().as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_decode_strips_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING token\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING token".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_strips_bare_lf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING token\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING token".to_string()));
    }

    #[test]
    fn test_decode_partial_line_waits() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING to");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"ken\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING token".to_string()));
    }

    #[test]
    fn test_decode_drains_multiple_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("NICK alice\r\nUSER al 0 * :Alice\nJOIN #room\r\n");
        assert_eq!(
            drain(&mut codec, &mut buf),
            vec!["NICK alice", "USER al 0 * :Alice", "JOIN #room"]
        );
    }

    #[test]
    fn test_chunking_invariance() {
        // Any partition of the byte stream must reconstruct the exact same
        // ordered line sequence as one full-buffer read.
        let stream = b"PASS secret\r\nNICK alice\nUSER al 0 * :Alice A\r\nJOIN #room\r\nPRIVMSG #room :hi there\r\n";

        let mut whole = BytesMut::from(&stream[..]);
        let expected = drain(&mut LineCodec::new(), &mut whole);
        assert_eq!(expected.len(), 5);

        for chunk_size in 1..stream.len() {
            let mut codec = LineCodec::new();
            let mut buf = BytesMut::new();
            let mut lines = Vec::new();
            for chunk in stream.chunks(chunk_size) {
                buf.extend_from_slice(chunk);
                lines.extend(drain(&mut codec, &mut buf));
            }
            assert_eq!(lines, expected, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_oversized_line_is_fatal() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from("this line is far too long to frame\r\n");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_oversized_partial_is_fatal() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from("no terminator but way past the cap");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PING \xff\xfe\r\n"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        let msg: Message = "PONG tinircd.local :token".parse().unwrap();
        codec.encode(msg, &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG tinircd.local :token\r\n");
    }
}
