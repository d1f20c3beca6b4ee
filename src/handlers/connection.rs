//! Registration and connection-level commands: PASS, NICK, USER, PING.
//!
//! Registration is a conjunction, not a linear machine: NICK and USER may
//! arrive in either order once PASS has succeeded, so both check whether
//! they completed it and emit the welcome.

use tinirc_proto::{Command, Message, Prefix, Response};
use tracing::{debug, info, warn};

use super::Context;
use crate::error::{HandlerError, HandlerResult};

/// `PASS <password>` - authenticate the connection.
///
/// Success is silent; a wrong password draws 464 and tears the connection
/// down.
pub fn pass(ctx: &mut Context<'_>, password: &str) -> HandlerResult {
    if ctx.client().authenticated {
        return Err(HandlerError::AlreadyRegistered);
    }
    if password != ctx.config.password {
        warn!(id = %ctx.id, "incorrect password");
        return Err(HandlerError::PasswordMismatch);
    }
    ctx.client_mut().authenticated = true;
    debug!(id = %ctx.id, "password accepted");
    Ok(())
}

/// `NICK <nickname>` - set or change the nickname.
pub fn nick(ctx: &mut Context<'_>, nick: &str) -> HandlerResult {
    if !ctx.client().authenticated {
        return Err(HandlerError::NotAuthenticated);
    }
    if ctx.inner.nick_in_use(nick, ctx.id) {
        return Err(HandlerError::NicknameInUse(nick.to_string()));
    }

    let was_registered = ctx.client().is_registered();
    let client = ctx.client_mut();
    // Echo under the previous identity; a first NICK has none yet
    let echo_prefix = if client.nick.is_empty() {
        Prefix::new(nick, client.user.clone(), client.addr.ip().to_string())
    } else {
        client.prefix()
    };
    client.nick = nick.to_string();
    client.send(Message::from(Command::NICK(nick.to_string())).with_prefix(echo_prefix));
    info!(id = %ctx.id, nick = %nick, "nickname set");

    if !was_registered && ctx.client().is_registered() {
        welcome(ctx);
    }
    Ok(())
}

/// `USER <username> <mode> <unused> :<realname>` - set user details.
///
/// The username is immutable once set; a second USER draws 462.
pub fn user(ctx: &mut Context<'_>, username: &str, realname: &str) -> HandlerResult {
    if !ctx.client().authenticated {
        return Err(HandlerError::NotAuthenticated);
    }
    if !ctx.client().user.is_empty() {
        return Err(HandlerError::AlreadyRegistered);
    }

    let client = ctx.client_mut();
    client.user = username.to_string();
    client.realname = realname.trim_start().to_string();
    debug!(id = %ctx.id, user = %username, "user details set");

    if ctx.client().is_registered() {
        welcome(ctx);
    }
    Ok(())
}

/// `PING [<token>]` - liveness probe; echoed back as PONG.
pub fn ping(ctx: &Context<'_>, token: Option<&str>) -> HandlerResult {
    let token = token.unwrap_or_else(|| ctx.server_name());
    ctx.reply(Message::from(Command::PONG(
        ctx.server_name().to_string(),
        Some(token.to_string()),
    )));
    Ok(())
}

fn welcome(ctx: &Context<'_>) {
    let nick = ctx.client().nick.clone();
    ctx.reply(Response::welcome(&nick, &ctx.config.server.network));
    info!(id = %ctx.id, nick = %nick, "client registered");
}
