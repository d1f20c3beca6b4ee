//! Channel membership commands: JOIN, PART, KICK, INVITE, TOPIC, LIST.

use tinirc_proto::{ChannelExt, Command, Message, Prefix, Response};
use tracing::{debug, info};

use super::Context;
use crate::error::{ChannelError, HandlerResult};
use crate::state::{fanout, Channel, Registries, Topic};

/// `JOIN <channel> [<key>]`
///
/// A join of an unknown name creates the channel and makes the joiner its
/// operator; otherwise the invite-only, key and capacity gates apply, in
/// that order, with the invitation consumed between key and capacity.
pub fn join(ctx: &mut Context<'_>, name: &str, key: Option<&str>) -> HandlerResult {
    if !name.is_channel_name() {
        return Err(ChannelError::NoSuchChannel(name.to_string()).into());
    }

    let id = ctx.id;
    let created = !ctx.inner.channels.contains_key(name);
    {
        let channel = ctx
            .inner
            .channels
            .entry(name.to_string())
            .or_insert_with(|| Channel::new(name));
        if channel.is_member(id) {
            return Ok(());
        }
        if !created {
            channel.check_access(id, key)?;
            channel.consume_invitation(id);
            channel.check_capacity()?;
        }
        channel.insert_member(id, created);
    }
    ctx.client_mut().channels.insert(name.to_string());

    let nick = ctx.client().nick.clone();
    let prefix = ctx.client().prefix();
    let inner = &*ctx.inner;
    let Some(channel) = inner.channels.get(name) else {
        return Ok(());
    };

    let join_msg = Message::from(Command::JOIN(name.to_string(), None)).with_prefix(prefix);
    fanout(&inner.clients, channel, &join_msg, None);

    // Burst to the joiner: topic, then the member list
    let topic_reply = match &channel.topic {
        Some(topic) => Response::rpl_topic(&nick, name, &topic.text),
        None => Response::rpl_notopic(&nick, name),
    };
    ctx.reply(topic_reply);
    let names = names_string(inner, channel);
    ctx.reply(Response::rpl_namreply(&nick, name, &names));
    ctx.reply(Response::rpl_endofnames(&nick, name));

    if created {
        info!(channel = %name, by = %nick, "channel created");
    }
    debug!(channel = %name, nick = %nick, "joined");
    Ok(())
}

/// `PART <channel>`
pub fn part(ctx: &mut Context<'_>, name: &str) -> HandlerResult {
    let id = ctx.id;
    let prefix = ctx.client().prefix();
    let inner = &mut *ctx.inner;
    let Some(channel) = inner.channels.get(name) else {
        return Err(ChannelError::NoSuchChannel(name.to_string()).into());
    };
    if !channel.is_member(id) {
        return Err(ChannelError::NotOnChannel(name.to_string()).into());
    }

    // Announce to the whole channel, the leaver included, before removal
    let part_msg = Message::from(Command::PART(name.to_string())).with_prefix(prefix);
    fanout(&inner.clients, channel, &part_msg, None);
    inner.remove_from_channel(name, id);
    debug!(channel = %name, id = %id, "parted");
    Ok(())
}

/// `KICK <channel> <nick> [:<reason>]`
///
/// Operator-only. The kicked client receives the KICK line explicitly, then
/// loses its membership.
pub fn kick(
    ctx: &mut Context<'_>,
    name: &str,
    target_nick: &str,
    reason: Option<&str>,
) -> HandlerResult {
    let id = ctx.id;
    let kicker = ctx.client().nick.clone();
    let prefix = ctx.client().prefix();
    let inner = &mut *ctx.inner;
    let Some(channel) = inner.channels.get(name) else {
        return Err(ChannelError::NoSuchChannel(name.to_string()).into());
    };
    if !channel.is_member(id) {
        return Err(ChannelError::NotOnChannel(name.to_string()).into());
    }
    if !channel.is_operator(id) {
        return Err(ChannelError::ChanOpPrivsNeeded(name.to_string()).into());
    }

    let target_id = channel
        .members()
        .iter()
        .copied()
        .find(|m| inner.clients.get(m).is_some_and(|c| c.nick == target_nick));
    let Some(target_id) = target_id else {
        return Err(ChannelError::UserNotInChannel {
            nick: target_nick.to_string(),
            channel: name.to_string(),
        }
        .into());
    };

    let reason = reason.unwrap_or(&kicker);
    let kick_msg = Message::from(Command::KICK(
        name.to_string(),
        target_nick.to_string(),
        Some(reason.to_string()),
    ))
    .with_prefix(prefix);
    fanout(&inner.clients, channel, &kick_msg, Some(target_id));
    if let Some(target) = inner.clients.get(&target_id) {
        target.send(kick_msg);
    }

    inner.remove_from_channel(name, target_id);
    info!(channel = %name, kicker = %kicker, target = %target_nick, "user kicked");
    Ok(())
}

/// `INVITE <channel> <nick>`
///
/// Member-and-operator only; pre-authorizes the target to bypass +i.
pub fn invite(ctx: &mut Context<'_>, name: &str, target_nick: &str) -> HandlerResult {
    let id = ctx.id;
    let nick = ctx.client().nick.clone();
    let prefix = ctx.client().prefix();
    let inner = &mut *ctx.inner;
    let server_name = inner.server_name().to_string();

    let target_id = inner.find_by_nick(target_nick).map(|c| c.id);
    let Some(channel) = inner.channels.get_mut(name) else {
        return Err(ChannelError::NoSuchChannel(name.to_string()).into());
    };
    if !channel.is_member(id) {
        return Err(ChannelError::NotOnChannel(name.to_string()).into());
    }
    if !channel.is_operator(id) {
        return Err(ChannelError::ChanOpPrivsNeeded(name.to_string()).into());
    }
    let Some(target_id) = target_id else {
        return Err(crate::error::HandlerError::NoSuchNick(target_nick.to_string()));
    };
    channel.invite(target_id);

    if let Some(issuer) = inner.clients.get(&id) {
        issuer.send(
            Response::rpl_inviting(&nick, name, target_nick)
                .with_prefix(Prefix::ServerName(server_name)),
        );
    }
    if let Some(target) = inner.clients.get(&target_id) {
        target.send(
            Message::from(Command::INVITE(name.to_string(), target_nick.to_string()))
                .with_prefix(prefix),
        );
    }
    info!(channel = %name, by = %nick, target = %target_nick, "invitation issued");
    Ok(())
}

/// `TOPIC <channel> [:<topic>]`
///
/// An empty argument queries; a non-empty one sets, gated on membership and
/// - under +t - operator status.
pub fn topic(ctx: &mut Context<'_>, name: &str, arg: Option<&str>) -> HandlerResult {
    let id = ctx.id;
    let nick = ctx.client().nick.clone();
    let prefix = ctx.client().prefix();
    let inner = &mut *ctx.inner;
    let server_name = inner.server_name().to_string();
    let Some(channel) = inner.channels.get_mut(name) else {
        return Err(ChannelError::NoSuchChannel(name.to_string()).into());
    };

    match arg {
        None | Some("") => {
            let reply = match &channel.topic {
                Some(topic) => Response::rpl_topic(&nick, name, &topic.text),
                None => Response::rpl_notopic(&nick, name),
            };
            if let Some(issuer) = inner.clients.get(&id) {
                issuer.send(reply.with_prefix(Prefix::ServerName(server_name)));
            }
        }
        Some(text) => {
            if !channel.is_member(id) {
                return Err(ChannelError::NotOnChannel(name.to_string()).into());
            }
            if channel.topic_restricted && !channel.is_operator(id) {
                return Err(ChannelError::ChanOpPrivsNeeded(name.to_string()).into());
            }
            channel.topic = Some(Topic {
                text: text.to_string(),
                set_by: nick.clone(),
                set_at: chrono::Utc::now().timestamp(),
            });
            let change = Message::from(Command::TOPIC(name.to_string(), Some(text.to_string())))
                .with_prefix(prefix);
            if let Some(channel) = inner.channels.get(name) {
                fanout(&inner.clients, channel, &change, None);
            }
            info!(channel = %name, by = %nick, "topic changed");
        }
    }
    Ok(())
}

/// `LIST` - every channel, membership notwithstanding.
pub fn list(ctx: &Context<'_>) -> HandlerResult {
    let nick = ctx.client().nick.clone();
    let mut entries: Vec<(&String, &Channel)> = ctx.inner.channels.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (name, channel) in entries {
        let topic = channel.topic.as_ref().map(|t| t.text.as_str()).unwrap_or("");
        ctx.reply(Response::rpl_list(&nick, name, channel.member_count(), topic));
    }
    ctx.reply(Response::rpl_listend(&nick));
    Ok(())
}

/// Member list for 353: sorted by nickname, operators prefixed `@`.
fn names_string(inner: &Registries, channel: &Channel) -> String {
    let mut entries: Vec<(String, bool)> = channel
        .members()
        .iter()
        .filter_map(|m| {
            inner
                .clients
                .get(m)
                .map(|c| (c.nick.clone(), channel.is_operator(*m)))
        })
        .collect();
    entries.sort();

    let mut out = String::new();
    for (i, (nick, op)) in entries.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        if *op {
            out.push('@');
        }
        out.push_str(nick);
    }
    out
}
