//! tinirc-proto - wire protocol support for the tinircd chat server.
//!
//! This crate covers everything that happens between raw transport bytes and
//! a typed command: line framing ([`LineCodec`]), message parsing and
//! serialization ([`Message`], [`Command`], [`Prefix`]), and the numeric
//! reply vocabulary ([`Response`]).
//!
//! The grammar is a practical subset of the IRC client protocol: verbs are
//! matched case-sensitively, parameters are space-separated, and a `:`
//! introduces a trailing parameter that runs to the end of the line.

pub mod chan;
pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;
pub mod response;

pub use chan::ChannelExt;
pub use command::Command;
pub use error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use line::LineCodec;
pub use message::Message;
pub use prefix::Prefix;
pub use response::Response;
