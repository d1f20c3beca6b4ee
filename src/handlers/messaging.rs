//! PRIVMSG delivery: channel fan-out and direct unicast.

use tinirc_proto::{ChannelExt, Command, Message};
use tracing::debug;

use super::Context;
use crate::error::{ChannelError, HandlerError, HandlerResult};
use crate::state::fanout;

/// `PRIVMSG <target> :<message>`
///
/// A channel target fans out to every member but the sender; a nickname
/// target is a direct unicast.
pub fn privmsg(ctx: &Context<'_>, target: &str, text: &str) -> HandlerResult {
    if text.is_empty() {
        return Err(HandlerError::NoTextToSend);
    }

    let id = ctx.id;
    let msg = Message::from(Command::PRIVMSG(target.to_string(), text.to_string()))
        .with_prefix(ctx.client().prefix());

    if target.is_channel_name() {
        let Some(channel) = ctx.inner.channels.get(target) else {
            return Err(ChannelError::NoSuchChannel(target.to_string()).into());
        };
        if !channel.is_member(id) {
            return Err(ChannelError::NotOnChannel(target.to_string()).into());
        }
        fanout(&ctx.inner.clients, channel, &msg, Some(id));
        debug!(channel = %target, from = %id, "channel message");
    } else {
        let Some(peer) = ctx.inner.find_by_nick(target) else {
            return Err(HandlerError::NoSuchNick(target.to_string()));
        };
        peer.send(msg);
        debug!(to = %target, from = %id, "direct message");
    }
    Ok(())
}
