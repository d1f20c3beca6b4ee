//! Message prefix types.
//!
//! A prefix identifies the origin of a message: either the server itself or
//! a user's `nick!user@host` mask.

use std::fmt;

/// Message prefix - identifies the origin of a message.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server name (e.g., "tinircd.local").
    ServerName(String),
    /// User prefix: (nickname, username, hostname).
    ///
    /// Username and hostname may be empty before registration completes;
    /// rendering degrades to the bare nickname in that case.
    Nickname(String, String, String),
}

impl Prefix {
    /// Shorthand for a full user prefix.
    pub fn new(
        nick: impl Into<String>,
        user: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Prefix::Nickname(nick.into(), user.into(), host.into())
    }

    /// Lenient parse of a prefix string (without the leading `:`).
    ///
    /// A name containing a dot and no `!`/`@` separators is taken as a
    /// server name; everything else is a user mask.
    pub fn new_from_str(s: &str) -> Self {
        let (name, rest) = match s.split_once('!') {
            Some((n, r)) => (n, Some(r)),
            None => (s, None),
        };
        match rest {
            Some(rest) => {
                let (user, host) = rest.split_once('@').unwrap_or((rest, ""));
                Prefix::Nickname(name.to_string(), user.to_string(), host.to_string())
            }
            None => match s.split_once('@') {
                Some((n, h)) => Prefix::Nickname(n.to_string(), String::new(), h.to_string()),
                None if s.contains('.') => Prefix::ServerName(s.to_string()),
                None => Prefix::Nickname(s.to_string(), String::new(), String::new()),
            },
        }
    }

    /// The nickname, if this is a user prefix.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) => Some(nick),
            Prefix::ServerName(_) => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => write!(f, "{}", name),
            Prefix::Nickname(nick, user, host) => {
                write!(f, "{}", nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}
