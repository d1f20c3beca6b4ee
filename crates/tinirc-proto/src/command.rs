//! Typed commands and the per-verb argument grammar.
//!
//! [`Command::new`] maps a verb and its already-tokenized parameters into a
//! typed variant. Verbs are matched case-sensitively; anything unrecognized
//! - or a known verb missing required parameters - falls back to
//! [`Command::Raw`] so the dispatch layer can decide between "unknown
//! command" and "not enough parameters".

use std::fmt;

use crate::response::Response;

/// A protocol command with its parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// `PASS <password>`
    PASS(String),
    /// `NICK <nickname>`
    NICK(String),
    /// `USER <username> <mode> <unused> :<realname>`
    USER(String, String, String, String),
    /// `JOIN <channel> [<key>]`
    JOIN(String, Option<String>),
    /// `PART <channel>`
    PART(String),
    /// `PRIVMSG <target> :<message>`
    PRIVMSG(String, String),
    /// `QUIT [:<message>]`
    QUIT(Option<String>),
    /// `LIST`
    LIST,
    /// `KICK <channel> <nick> [:<reason>]`
    KICK(String, String, Option<String>),
    /// `INVITE <channel> <nick>`
    INVITE(String, String),
    /// `TOPIC <channel> [:<topic>]`
    TOPIC(String, Option<String>),
    /// `MODE <channel> <modestring> [<param>]`
    MODE(String, String, Option<String>),
    /// `PING [<token>]`
    PING(Option<String>),
    /// `PONG <target> [:<token>]`
    PONG(String, Option<String>),
    /// `ERROR :<message>` - server-to-client fatal notice
    ERROR(String),
    /// Numeric reply with its parameters
    Response(Response, Vec<String>),
    /// Anything else: (verb, params)
    Raw(String, Vec<String>),
}

/// Verbs the dispatch layer implements.
const KNOWN_VERBS: &[&str] = &[
    "PASS", "NICK", "USER", "JOIN", "PART", "PRIVMSG", "QUIT", "LIST", "KICK", "INVITE", "TOPIC",
    "MODE", "PING", "PONG",
];

impl Command {
    /// Build a typed command from a verb and tokenized parameters.
    ///
    /// `args` must already have trailing-parameter handling applied (a
    /// `:`-introduced parameter arrives as a single element). Remainder-style
    /// parameters (PRIVMSG text, USER realname, QUIT message) are re-joined
    /// from every token past their position, so both `PRIVMSG #r :hi there`
    /// and `PRIVMSG #r hi there` yield the message `hi there`.
    pub fn new(verb: &str, args: Vec<String>) -> Command {
        match verb {
            "PASS" if !args.is_empty() => Command::PASS(args[0].clone()),
            "NICK" if !args.is_empty() => Command::NICK(args[0].clone()),
            "USER" if args.len() >= 4 => Command::USER(
                args[0].clone(),
                args[1].clone(),
                args[2].clone(),
                args[3..].join(" "),
            ),
            "JOIN" if !args.is_empty() => Command::JOIN(args[0].clone(), args.get(1).cloned()),
            "PART" if !args.is_empty() => Command::PART(args[0].clone()),
            "PRIVMSG" if !args.is_empty() => {
                Command::PRIVMSG(args[0].clone(), args[1..].join(" "))
            }
            "QUIT" => Command::QUIT(if args.is_empty() {
                None
            } else {
                Some(args.join(" "))
            }),
            "LIST" => Command::LIST,
            "KICK" if args.len() >= 2 => Command::KICK(
                args[0].clone(),
                args[1].clone(),
                if args.len() > 2 {
                    Some(args[2..].join(" "))
                } else {
                    None
                },
            ),
            "INVITE" if args.len() >= 2 => Command::INVITE(args[0].clone(), args[1].clone()),
            "TOPIC" if !args.is_empty() => Command::TOPIC(
                args[0].clone(),
                if args.len() > 1 {
                    Some(args[1..].join(" "))
                } else {
                    None
                },
            ),
            "MODE" if args.len() >= 2 => {
                Command::MODE(args[0].clone(), args[1].clone(), args.get(2).cloned())
            }
            "PING" => Command::PING(args.first().cloned()),
            "PONG" => Command::PONG(
                args.first().cloned().unwrap_or_default(),
                args.get(1).cloned(),
            ),
            "ERROR" => Command::ERROR(args.join(" ")),
            _ => Command::Raw(verb.to_string(), args),
        }
    }

    /// Whether the dispatch layer implements this verb at all.
    ///
    /// Distinguishes a [`Command::Raw`] produced by missing parameters (461)
    /// from a genuinely unknown verb (421).
    pub fn is_known_verb(verb: &str) -> bool {
        KNOWN_VERBS.contains(&verb)
    }

    /// The wire verb (or numeric) of this command.
    pub fn verb(&self) -> String {
        match self {
            Command::PASS(..) => "PASS".to_string(),
            Command::NICK(..) => "NICK".to_string(),
            Command::USER(..) => "USER".to_string(),
            Command::JOIN(..) => "JOIN".to_string(),
            Command::PART(..) => "PART".to_string(),
            Command::PRIVMSG(..) => "PRIVMSG".to_string(),
            Command::QUIT(..) => "QUIT".to_string(),
            Command::LIST => "LIST".to_string(),
            Command::KICK(..) => "KICK".to_string(),
            Command::INVITE(..) => "INVITE".to_string(),
            Command::TOPIC(..) => "TOPIC".to_string(),
            Command::MODE(..) => "MODE".to_string(),
            Command::PING(..) => "PING".to_string(),
            Command::PONG(..) => "PONG".to_string(),
            Command::ERROR(..) => "ERROR".to_string(),
            Command::Response(resp, _) => resp.to_string(),
            Command::Raw(verb, _) => verb.clone(),
        }
    }
}

/// Whether a parameter needs the `:` trailing sigil to survive re-parsing.
fn needs_trailing(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[String], force_trailing: bool) -> fmt::Result {
    let Some((last, rest)) = params.split_last() else {
        return Ok(());
    };
    for param in rest {
        write!(f, " {}", param)?;
    }
    if force_trailing || needs_trailing(last) {
        write!(f, " :{}", last)
    } else {
        write!(f, " {}", last)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PASS(password) => write!(f, "PASS {}", password),
            Command::NICK(nick) => write!(f, "NICK {}", nick),
            Command::USER(user, mode, unused, realname) => {
                write!(f, "USER {} {} {} :{}", user, mode, unused, realname)
            }
            Command::JOIN(channel, Some(key)) => write!(f, "JOIN {} {}", channel, key),
            Command::JOIN(channel, None) => write!(f, "JOIN {}", channel),
            Command::PART(channel) => write!(f, "PART {}", channel),
            Command::PRIVMSG(target, text) => write!(f, "PRIVMSG {} :{}", target, text),
            Command::QUIT(Some(message)) => write!(f, "QUIT :{}", message),
            Command::QUIT(None) => write!(f, "QUIT"),
            Command::LIST => write!(f, "LIST"),
            Command::KICK(channel, nick, Some(reason)) => {
                write!(f, "KICK {} {} :{}", channel, nick, reason)
            }
            Command::KICK(channel, nick, None) => write!(f, "KICK {} {}", channel, nick),
            Command::INVITE(channel, nick) => write!(f, "INVITE {} {}", channel, nick),
            Command::TOPIC(channel, Some(topic)) => write!(f, "TOPIC {} :{}", channel, topic),
            Command::TOPIC(channel, None) => write!(f, "TOPIC {}", channel),
            Command::MODE(channel, modes, Some(param)) => {
                write!(f, "MODE {} {} {}", channel, modes, param)
            }
            Command::MODE(channel, modes, None) => write!(f, "MODE {} {}", channel, modes),
            Command::PING(Some(token)) => write!(f, "PING {}", token),
            Command::PING(None) => write!(f, "PING"),
            Command::PONG(target, Some(token)) => write!(f, "PONG {} :{}", target, token),
            Command::PONG(target, None) => write!(f, "PONG {}", target),
            Command::ERROR(message) => write!(f, "ERROR :{}", message),
            Command::Response(resp, params) => {
                write!(f, "{}", resp)?;
                write_params(f, params, true)
            }
            Command::Raw(verb, params) => {
                write!(f, "{}", verb)?;
                write_params(f, params, false)
            }
        }
    }
}
