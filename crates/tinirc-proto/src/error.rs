//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised by the framing layer.
///
/// All of these are fatal to the connection they occur on: a peer that
/// overflows the line buffer or sends non-UTF-8 bytes cannot be resynced.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Underlying transport I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line (terminated or not) exceeded the framing buffer cap.
    #[error("message too long: {actual} bytes exceeds limit of {limit}")]
    MessageTooLong {
        /// Observed buffered length.
        actual: usize,
        /// Configured maximum line length.
        limit: usize,
    },

    /// A complete line was not valid UTF-8.
    #[error("invalid UTF-8 in line: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Errors raised while parsing a framed line into a [`crate::Message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageParseError {
    /// The line was empty (or whitespace only) after framing.
    #[error("empty message")]
    EmptyMessage,

    /// The line had a `:` prefix sigil but nothing after it.
    #[error("invalid prefix: {0:?}")]
    InvalidPrefix(String),
}
