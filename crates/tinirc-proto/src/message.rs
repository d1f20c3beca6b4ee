//! Owned protocol messages: parsing and serialization.

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::MessageParseError;
use crate::prefix::Prefix;
use crate::response::Response;

/// An owned protocol message: optional origin prefix plus a command.
///
/// # Example
///
/// ```
/// use tinirc_proto::{Command, Message};
///
/// let msg: Message = ":alice!al@10.0.0.1 PRIVMSG #room :hi there".parse().unwrap();
/// assert_eq!(msg.command, Command::PRIVMSG("#room".into(), "hi there".into()));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Origin of the message (`None` for client-to-server commands).
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Attach an origin prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// The numeric response carried by this message, if any.
    pub fn response(&self) -> Option<Response> {
        match &self.command {
            Command::Response(resp, _) => Some(*resp),
            _ => None,
        }
    }

    /// The nickname in the message prefix, if present.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    /// Parse one framed line (terminator already stripped).
    ///
    /// Grammar: `[:<prefix> ] <verb> [<param> ...] [:<trailing>]`. Runs of
    /// spaces between tokens are tolerated; the trailing parameter keeps its
    /// internal spacing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        if rest.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let prefix = if let Some(stripped) = rest.strip_prefix(':') {
            let (raw, remainder) = match stripped.split_once(' ') {
                Some((raw, remainder)) => (raw, remainder),
                None => (stripped, ""),
            };
            if raw.is_empty() {
                return Err(MessageParseError::InvalidPrefix(s.to_string()));
            }
            rest = remainder.trim_start_matches(' ');
            Some(Prefix::new_from_str(raw))
        } else {
            None
        };

        if rest.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let (verb, mut rest) = match rest.split_once(' ') {
            Some((verb, remainder)) => (verb, remainder),
            None => (rest, ""),
        };

        let mut args = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                args.push(trailing.to_string());
                break;
            }
            match rest.split_once(' ') {
                Some((arg, remainder)) => {
                    args.push(arg.to_string());
                    rest = remainder;
                }
                None => {
                    args.push(rest.to_string());
                    break;
                }
            }
        }

        // Numeric replies parse back into their typed form so test clients
        // can match on Response codes.
        let command = match verb.parse::<u16>().ok().and_then(Response::from_code) {
            Some(resp) => Command::Response(resp, args),
            None => Command::new(verb, args),
        };

        Ok(Message { prefix, command })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)
    }
}
