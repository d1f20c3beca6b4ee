//! The MODE engine: `MODE <channel> <modechar> [<param>]`.

use tinirc_proto::{Command, Message};
use tracing::info;

use super::Context;
use crate::error::{ChannelError, HandlerError, HandlerResult};
use crate::state::fanout;

/// Apply one channel mode change. Operator-only; every successful change is
/// broadcast to the whole channel with its parameter where one applies.
pub fn mode(
    ctx: &mut Context<'_>,
    name: &str,
    modestring: &str,
    param: Option<&str>,
) -> HandlerResult {
    let id = ctx.id;
    let prefix = ctx.client().prefix();
    let inner = &mut *ctx.inner;

    // Resolve a possible +o/-o target up front; side-effect free for the
    // flags whose parameter is not a nickname.
    let target = param.and_then(|nick| inner.find_by_nick(nick).map(|c| (c.id, c.nick.clone())));

    let Some(channel) = inner.channels.get_mut(name) else {
        return Err(ChannelError::NoSuchChannel(name.to_string()).into());
    };
    if !channel.is_operator(id) {
        return Err(ChannelError::ChanOpPrivsNeeded(name.to_string()).into());
    }

    let flags: Vec<char> = modestring.chars().collect();
    let (adding, flag) = match flags.as_slice() {
        ['+', flag] => (true, *flag),
        ['-', flag] => (false, *flag),
        _ => {
            // Only a single signed mode character is in the grammar
            let offending = flags
                .iter()
                .find(|c| !matches!(c, '+' | '-'))
                .copied()
                .unwrap_or('?');
            return Err(ChannelError::UnknownMode(offending).into());
        }
    };

    let mut broadcast_param: Option<String> = None;
    match flag {
        'i' => channel.invite_only = adding,
        't' => channel.topic_restricted = adding,
        'k' => {
            if adding {
                let Some(key) = param.filter(|p| !p.is_empty()) else {
                    return Err(HandlerError::NeedMoreParams("MODE".to_string()));
                };
                channel.key = Some(key.to_string());
                broadcast_param = Some(key.to_string());
            } else {
                channel.key = None;
            }
        }
        'o' => {
            let Some(wanted) = param else {
                return Err(HandlerError::NeedMoreParams("MODE".to_string()));
            };
            // The target must currently be a member
            let member = target.filter(|(tid, _)| channel.is_member(*tid));
            let Some((target_id, target_nick)) = member else {
                return Err(ChannelError::UserNotInChannel {
                    nick: wanted.to_string(),
                    channel: name.to_string(),
                }
                .into());
            };
            if adding {
                channel.grant_operator(target_id);
            } else {
                channel.revoke_operator(target_id);
            }
            broadcast_param = Some(target_nick);
        }
        'l' => {
            if adding {
                let limit = param
                    .and_then(|p| p.parse::<u32>().ok())
                    .filter(|l| *l > 0)
                    .ok_or_else(|| HandlerError::NeedMoreParams("MODE".to_string()))?;
                channel.limit = Some(limit);
                broadcast_param = Some(limit.to_string());
            } else {
                channel.limit = None;
            }
        }
        other => return Err(ChannelError::UnknownMode(other).into()),
    }

    let modes = format!("{}{}", if adding { '+' } else { '-' }, flag);
    info!(channel = %name, modes = %modes, param = ?broadcast_param, "mode changed");
    let change =
        Message::from(Command::MODE(name.to_string(), modes, broadcast_param)).with_prefix(prefix);
    if let Some(channel) = inner.channels.get(name) {
        fanout(&inner.clients, channel, &change, None);
    }
    Ok(())
}
