//! Command dispatch.
//!
//! One framed line comes in, gets parsed into a typed [`Command`], passes
//! the registration gate, and is routed to its handler. Handlers run
//! synchronously under the hub lock and signal failure through
//! [`HandlerError`], which the dispatcher converts into exactly one reply
//! line - a failing command never disturbs another client or the run loop.

pub mod channel;
pub mod connection;
pub mod messaging;
pub mod mode;

use tinirc_proto::{Command, Message, Prefix, Response};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{HandlerError, HandlerResult};
use crate::state::{Client, ClientId, Hub, Registries};

/// What the connection task should do after a line has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// Keep reading.
    Continue,
    /// Tear the connection down; queued replies are flushed first.
    Disconnect(Option<String>),
}

/// Handler context: the issuing connection plus both registries.
pub struct Context<'a> {
    pub id: ClientId,
    pub inner: &'a mut Registries,
    pub config: &'a Config,
}

impl Context<'_> {
    pub fn server_name(&self) -> &str {
        &self.config.server.name
    }

    /// The issuing client.
    ///
    /// Dispatch verifies the connection identity before building a context,
    /// and the registry lock is held throughout, so the entity is present.
    pub fn client(&self) -> &Client {
        self.inner
            .clients
            .get(&self.id)
            .expect("dispatched command has a live client")
    }

    pub fn client_mut(&mut self) -> &mut Client {
        self.inner
            .clients
            .get_mut(&self.id)
            .expect("dispatched command has a live client")
    }

    /// Current nickname for addressing replies (`*` before one is set).
    pub fn nick(&self) -> String {
        self.client().display_nick().to_string()
    }

    /// Queue a message to the issuing client as-is.
    pub fn send(&self, msg: Message) {
        self.client().send(msg);
    }

    /// Queue a server-prefixed reply to the issuing client.
    pub fn reply(&self, msg: Message) {
        self.send(msg.with_prefix(Prefix::ServerName(self.server_name().to_string())));
    }
}

/// Only PASS, NICK and USER may execute before full registration.
fn requires_registration(command: &Command) -> bool {
    !matches!(
        command,
        Command::PASS(_) | Command::NICK(_) | Command::USER(..)
    )
}

/// Process one framed line from a connection.
pub fn handle_line(hub: &Hub, id: ClientId, line: &str) -> DispatchResult {
    let msg: Message = match line.parse() {
        Ok(msg) => msg,
        // Blank lines between commands are tolerated
        Err(_) => return DispatchResult::Continue,
    };

    let mut guard = hub.lock();
    let inner = &mut *guard;
    if !inner.clients.contains_key(&id) {
        warn!(%id, "line from unknown connection identity");
        return DispatchResult::Disconnect(None);
    }

    // Known-benign capability probe: skipped without reply or side effects
    if matches!(&msg.command, Command::Raw(verb, _) if verb == "CAP") {
        return DispatchResult::Continue;
    }

    let mut ctx = Context {
        id,
        inner,
        config: &hub.config,
    };
    debug!(%id, verb = %msg.command.verb(), "dispatching");

    if requires_registration(&msg.command) && !ctx.client().is_registered() {
        let nick = ctx.nick();
        ctx.reply(Response::err_notregistered(&nick));
        return DispatchResult::Continue;
    }

    match dispatch(&mut ctx, msg.command) {
        Ok(()) => DispatchResult::Continue,
        Err(HandlerError::Quit(reason)) => {
            let reason = reason
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "Client Quit".to_string());
            ctx.inner.remove_client(id, &reason, true);
            DispatchResult::Disconnect(Some(reason))
        }
        Err(err) => {
            let nick = ctx.nick();
            if let Some(reply) = err.to_irc_reply(hub.server_name(), &nick) {
                ctx.send(reply);
            }
            if err.is_fatal() {
                warn!(%id, error = %err, "connection-fatal command error");
                ctx.inner.remove_client(id, "Access denied", false);
                DispatchResult::Disconnect(Some(err.to_string()))
            } else {
                DispatchResult::Continue
            }
        }
    }
}

fn dispatch(ctx: &mut Context<'_>, command: Command) -> HandlerResult {
    match command {
        Command::PASS(password) => connection::pass(ctx, &password),
        Command::NICK(nick) => connection::nick(ctx, &nick),
        Command::USER(username, _mode, _unused, realname) => {
            connection::user(ctx, &username, &realname)
        }
        Command::JOIN(name, key) => channel::join(ctx, &name, key.as_deref()),
        Command::PART(name) => channel::part(ctx, &name),
        Command::PRIVMSG(target, text) => messaging::privmsg(ctx, &target, &text),
        Command::QUIT(message) => Err(HandlerError::Quit(message)),
        Command::LIST => channel::list(ctx),
        Command::KICK(name, target, reason) => {
            channel::kick(ctx, &name, &target, reason.as_deref())
        }
        Command::INVITE(name, target) => channel::invite(ctx, &name, &target),
        Command::TOPIC(name, topic) => channel::topic(ctx, &name, topic.as_deref()),
        Command::MODE(name, modes, param) => mode::mode(ctx, &name, &modes, param.as_deref()),
        Command::PING(token) => connection::ping(ctx, token.as_deref()),
        // Clients may echo these back; they carry no server-side effects
        Command::PONG(..) | Command::ERROR(_) | Command::Response(..) => Ok(()),
        Command::Raw(verb, _) => {
            if Command::is_known_verb(&verb) {
                Err(HandlerError::NeedMoreParams(verb))
            } else {
                Err(HandlerError::UnknownCommand(verb))
            }
        }
    }
}
