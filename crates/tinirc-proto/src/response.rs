//! Numeric response codes.
//!
//! A practical subset of the IRC numerics: exactly the replies the server
//! emits. Constructors centralize the human-readable wire text so reply
//! formatting stays testable in isolation from the command handlers.

use std::fmt;

use crate::command::Command;
use crate::message::Message;

/// Numeric server response code.
///
/// Rendered on the wire as a zero-padded three-digit code. Codes 001-399
/// are command replies, 400-599 error replies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum Response {
    /// 001 - Welcome to the network
    RPL_WELCOME = 1,
    /// 322 - LIST entry
    RPL_LIST = 322,
    /// 323 - End of LIST
    RPL_LISTEND = 323,
    /// 331 - No topic is set
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 341 - Invite confirmation to the issuer
    RPL_INVITING = 341,
    /// 353 - NAMES reply
    RPL_NAMREPLY = 353,
    /// 366 - End of NAMES
    RPL_ENDOFNAMES = 366,
    /// 401 - No such nick/channel
    ERR_NOSUCHNICK = 401,
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 412 - No text to send
    ERR_NOTEXTTOSEND = 412,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 433 - Nickname in use
    ERR_NICKNAMEINUSE = 433,
    /// 441 - User not on that channel
    ERR_USERNOTINCHANNEL = 441,
    /// 442 - You're not on that channel
    ERR_NOTONCHANNEL = 442,
    /// 451 - Not registered
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - May not reregister
    ERR_ALREADYREGISTRED = 462,
    /// 464 - Password incorrect
    ERR_PASSWDMISMATCH = 464,
    /// 471 - Channel is full (+l)
    ERR_CHANNELISFULL = 471,
    /// 472 - Unknown mode character
    ERR_UNKNOWNMODE = 472,
    /// 473 - Invite-only channel (+i)
    ERR_INVITEONLYCHAN = 473,
    /// 475 - Bad channel key (+k)
    ERR_BADCHANNELKEY = 475,
    /// 482 - Channel operator privileges needed
    ERR_CHANOPRIVSNEEDED = 482,
}

impl Response {
    /// The numeric code.
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this numeric is an error reply.
    pub fn is_error(&self) -> bool {
        self.code() >= 400
    }

    /// Look up a response by numeric code.
    pub fn from_code(code: u16) -> Option<Response> {
        use Response::*;
        Some(match code {
            1 => RPL_WELCOME,
            322 => RPL_LIST,
            323 => RPL_LISTEND,
            331 => RPL_NOTOPIC,
            332 => RPL_TOPIC,
            341 => RPL_INVITING,
            353 => RPL_NAMREPLY,
            366 => RPL_ENDOFNAMES,
            401 => ERR_NOSUCHNICK,
            403 => ERR_NOSUCHCHANNEL,
            412 => ERR_NOTEXTTOSEND,
            421 => ERR_UNKNOWNCOMMAND,
            433 => ERR_NICKNAMEINUSE,
            441 => ERR_USERNOTINCHANNEL,
            442 => ERR_NOTONCHANNEL,
            451 => ERR_NOTREGISTERED,
            461 => ERR_NEEDMOREPARAMS,
            462 => ERR_ALREADYREGISTRED,
            464 => ERR_PASSWDMISMATCH,
            471 => ERR_CHANNELISFULL,
            472 => ERR_UNKNOWNMODE,
            473 => ERR_INVITEONLYCHAN,
            475 => ERR_BADCHANNELKEY,
            482 => ERR_CHANOPRIVSNEEDED,
            _ => return None,
        })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

fn reply(response: Response, args: Vec<String>) -> Message {
    Message {
        prefix: None,
        command: Command::Response(response, args),
    }
}

/// Reply constructors.
///
/// Each takes the addressee's current nickname first (callers pass `*`
/// before one is set) and returns an un-prefixed [`Message`]; the dispatch
/// layer stamps the server prefix on.
impl Response {
    /// 001 welcome reply, sent once full registration completes.
    pub fn welcome(nick: &str, network: &str) -> Message {
        reply(
            Response::RPL_WELCOME,
            vec![
                nick.to_string(),
                format!("Welcome to the {} Network, {}", network, nick),
            ],
        )
    }

    /// 322 LIST entry: channel name, member count, topic.
    pub fn rpl_list(nick: &str, channel: &str, members: usize, topic: &str) -> Message {
        reply(
            Response::RPL_LIST,
            vec![
                nick.to_string(),
                channel.to_string(),
                members.to_string(),
                topic.to_string(),
            ],
        )
    }

    /// 323 end of LIST.
    pub fn rpl_listend(nick: &str) -> Message {
        reply(
            Response::RPL_LISTEND,
            vec![nick.to_string(), "End of /LIST".to_string()],
        )
    }

    /// 331 no topic set.
    pub fn rpl_notopic(nick: &str, channel: &str) -> Message {
        reply(
            Response::RPL_NOTOPIC,
            vec![
                nick.to_string(),
                channel.to_string(),
                "No topic is set".to_string(),
            ],
        )
    }

    /// 332 current topic.
    pub fn rpl_topic(nick: &str, channel: &str, topic: &str) -> Message {
        reply(
            Response::RPL_TOPIC,
            vec![nick.to_string(), channel.to_string(), topic.to_string()],
        )
    }

    /// 341 invite confirmation: channel then invited nick.
    pub fn rpl_inviting(nick: &str, channel: &str, target: &str) -> Message {
        reply(
            Response::RPL_INVITING,
            vec![nick.to_string(), channel.to_string(), target.to_string()],
        )
    }

    /// 353 NAMES reply with the `=` public-channel symbol.
    pub fn rpl_namreply(nick: &str, channel: &str, names: &str) -> Message {
        reply(
            Response::RPL_NAMREPLY,
            vec![
                nick.to_string(),
                "=".to_string(),
                channel.to_string(),
                names.to_string(),
            ],
        )
    }

    /// 366 end of NAMES.
    pub fn rpl_endofnames(nick: &str, channel: &str) -> Message {
        reply(
            Response::RPL_ENDOFNAMES,
            vec![
                nick.to_string(),
                channel.to_string(),
                "End of /NAMES list".to_string(),
            ],
        )
    }

    /// 401 no such nick/channel.
    pub fn err_nosuchnick(nick: &str, target: &str) -> Message {
        reply(
            Response::ERR_NOSUCHNICK,
            vec![
                nick.to_string(),
                target.to_string(),
                "No such nick/channel".to_string(),
            ],
        )
    }

    /// 403 no such channel.
    pub fn err_nosuchchannel(nick: &str, channel: &str) -> Message {
        reply(
            Response::ERR_NOSUCHCHANNEL,
            vec![
                nick.to_string(),
                channel.to_string(),
                "No such channel".to_string(),
            ],
        )
    }

    /// 412 no text to send.
    pub fn err_notexttosend(nick: &str) -> Message {
        reply(
            Response::ERR_NOTEXTTOSEND,
            vec![nick.to_string(), "No text to send".to_string()],
        )
    }

    /// 421 unknown command.
    pub fn err_unknowncommand(nick: &str, command: &str) -> Message {
        reply(
            Response::ERR_UNKNOWNCOMMAND,
            vec![
                nick.to_string(),
                command.to_string(),
                "Unknown command".to_string(),
            ],
        )
    }

    /// 433 nickname already in use.
    pub fn err_nicknameinuse(nick: &str, wanted: &str) -> Message {
        reply(
            Response::ERR_NICKNAMEINUSE,
            vec![
                nick.to_string(),
                wanted.to_string(),
                "Nickname is already in use".to_string(),
            ],
        )
    }

    /// 441 target not on that channel.
    pub fn err_usernotinchannel(nick: &str, target: &str, channel: &str) -> Message {
        reply(
            Response::ERR_USERNOTINCHANNEL,
            vec![
                nick.to_string(),
                target.to_string(),
                channel.to_string(),
                "They aren't on that channel".to_string(),
            ],
        )
    }

    /// 442 issuer not on that channel.
    pub fn err_notonchannel(nick: &str, channel: &str) -> Message {
        reply(
            Response::ERR_NOTONCHANNEL,
            vec![
                nick.to_string(),
                channel.to_string(),
                "You're not on that channel".to_string(),
            ],
        )
    }

    /// 451 not registered.
    pub fn err_notregistered(nick: &str) -> Message {
        reply(
            Response::ERR_NOTREGISTERED,
            vec![nick.to_string(), "You have not registered".to_string()],
        )
    }

    /// 451 sent for NICK/USER before a successful PASS.
    pub fn err_notauthenticated(nick: &str) -> Message {
        reply(
            Response::ERR_NOTREGISTERED,
            vec![
                nick.to_string(),
                "You must authenticate first".to_string(),
            ],
        )
    }

    /// 461 not enough parameters.
    pub fn err_needmoreparams(nick: &str, command: &str) -> Message {
        reply(
            Response::ERR_NEEDMOREPARAMS,
            vec![
                nick.to_string(),
                command.to_string(),
                "Not enough parameters".to_string(),
            ],
        )
    }

    /// 462 may not reregister.
    pub fn err_alreadyregistred(nick: &str) -> Message {
        reply(
            Response::ERR_ALREADYREGISTRED,
            vec![nick.to_string(), "You may not reregister".to_string()],
        )
    }

    /// 464 password incorrect.
    pub fn err_passwdmismatch(nick: &str) -> Message {
        reply(
            Response::ERR_PASSWDMISMATCH,
            vec![nick.to_string(), "Password incorrect".to_string()],
        )
    }

    /// 471 channel is full.
    pub fn err_channelisfull(nick: &str, channel: &str) -> Message {
        reply(
            Response::ERR_CHANNELISFULL,
            vec![
                nick.to_string(),
                channel.to_string(),
                "Cannot join channel (+l)".to_string(),
            ],
        )
    }

    /// 472 unknown mode character.
    pub fn err_unknownmode(nick: &str, modechar: char) -> Message {
        reply(
            Response::ERR_UNKNOWNMODE,
            vec![
                nick.to_string(),
                modechar.to_string(),
                "is unknown mode char to me".to_string(),
            ],
        )
    }

    /// 473 invite-only channel.
    pub fn err_inviteonlychan(nick: &str, channel: &str) -> Message {
        reply(
            Response::ERR_INVITEONLYCHAN,
            vec![
                nick.to_string(),
                channel.to_string(),
                "Cannot join channel (+i)".to_string(),
            ],
        )
    }

    /// 475 bad channel key.
    pub fn err_badchannelkey(nick: &str, channel: &str) -> Message {
        reply(
            Response::ERR_BADCHANNELKEY,
            vec![
                nick.to_string(),
                channel.to_string(),
                "Cannot join channel (+k)".to_string(),
            ],
        )
    }

    /// 482 channel operator privileges needed.
    pub fn err_chanoprivsneeded(nick: &str, channel: &str) -> Message {
        reply(
            Response::ERR_CHANOPRIVSNEEDED,
            vec![
                nick.to_string(),
                channel.to_string(),
                "You're not channel operator".to_string(),
            ],
        )
    }
}
