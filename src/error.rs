//! Unified error handling for tinircd.
//!
//! Protocol failures are handled where they are detected and converted into
//! a single numeric reply; nothing propagates across a command boundary.
//! The split mirrors the two layers that can fail: `HandlerError` for
//! dispatch and registration, `ChannelError` for the membership/mode engine.

use thiserror::Error;
use tinirc_proto::{Message, Prefix, Response};

/// Errors that can occur during command handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("not enough parameters for {0}")]
    NeedMoreParams(String),

    #[error("not registered")]
    NotRegistered,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("already registered")]
    AlreadyRegistered,

    /// Wrong connection password. The 464 reply is followed by teardown.
    #[error("password mismatch")]
    PasswordMismatch,

    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    #[error("no such nick: {0}")]
    NoSuchNick(String),

    #[error("no text to send")]
    NoTextToSend,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Client asked to leave; not a failure, but it travels the same path.
    #[error("client quit: {0:?}")]
    Quit(Option<String>),
}

/// Channel operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("no such channel: {0}")]
    NoSuchChannel(String),

    #[error("not on channel {0}")]
    NotOnChannel(String),

    #[error("user {nick} is not on channel {channel}")]
    UserNotInChannel { nick: String, channel: String },

    #[error("you're not channel operator on {0}")]
    ChanOpPrivsNeeded(String),

    #[error("cannot join channel (+i): {0}")]
    InviteOnlyChan(String),

    #[error("cannot join channel (+l): {0}")]
    ChannelIsFull(String),

    #[error("cannot join channel (+k): {0}")]
    BadChannelKey(String),

    #[error("unknown mode char: {0}")]
    UnknownMode(char),
}

impl HandlerError {
    /// Whether this error tears the connection down after its reply.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PasswordMismatch)
    }

    /// Convert to a numeric error reply, server-prefixed.
    ///
    /// Returns `None` for [`HandlerError::Quit`], which is teardown rather
    /// than a reply.
    pub fn to_irc_reply(&self, server_name: &str, nick: &str) -> Option<Message> {
        let msg = match self {
            Self::NeedMoreParams(cmd) => Response::err_needmoreparams(nick, cmd),
            Self::NotRegistered => Response::err_notregistered(nick),
            Self::NotAuthenticated => Response::err_notauthenticated(nick),
            Self::AlreadyRegistered => Response::err_alreadyregistred(nick),
            Self::PasswordMismatch => Response::err_passwdmismatch(nick),
            Self::NicknameInUse(wanted) => Response::err_nicknameinuse(nick, wanted),
            Self::NoSuchNick(target) => Response::err_nosuchnick(nick, target),
            Self::NoTextToSend => Response::err_notexttosend(nick),
            Self::UnknownCommand(cmd) => Response::err_unknowncommand(nick, cmd),
            Self::Channel(err) => err.to_irc_reply(nick),
            Self::Quit(_) => return None,
        };
        Some(msg.with_prefix(Prefix::ServerName(server_name.to_string())))
    }
}

impl ChannelError {
    /// Convert to a numeric error reply (un-prefixed).
    pub fn to_irc_reply(&self, nick: &str) -> Message {
        match self {
            Self::NoSuchChannel(channel) => Response::err_nosuchchannel(nick, channel),
            Self::NotOnChannel(channel) => Response::err_notonchannel(nick, channel),
            Self::UserNotInChannel { nick: target, channel } => {
                Response::err_usernotinchannel(nick, target, channel)
            }
            Self::ChanOpPrivsNeeded(channel) => Response::err_chanoprivsneeded(nick, channel),
            Self::InviteOnlyChan(channel) => Response::err_inviteonlychan(nick, channel),
            Self::ChannelIsFull(channel) => Response::err_channelisfull(nick, channel),
            Self::BadChannelKey(channel) => Response::err_badchannelkey(nick, channel),
            Self::UnknownMode(flag) => Response::err_unknownmode(nick, *flag),
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
