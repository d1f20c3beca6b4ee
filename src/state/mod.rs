//! Shared server state.
//!
//! The [`Hub`] is the session orchestrator: it owns both registries (client
//! and channel) behind a single mutex. Every command executes entirely under
//! that lock with no await points, so registry mutation is serialized and
//! per-connection command order is preserved. Delivery goes through each
//! client's unbounded outbound queue, so fan-out never blocks the engine.

pub mod channel;
pub mod client;

pub use channel::{Channel, Topic};
pub use client::{Client, ClientId};

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tinirc_proto::{Command, Message, Prefix};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;

/// Queue a message to every member of a channel, optionally excluding one.
pub fn fanout(
    clients: &HashMap<ClientId, Client>,
    channel: &Channel,
    msg: &Message,
    exclude: Option<ClientId>,
) {
    for member in channel.members() {
        if Some(*member) == exclude {
            continue;
        }
        if let Some(client) = clients.get(member) {
            client.send(msg.clone());
        }
    }
}

/// The two server-wide registries, mutated only under the hub lock.
pub struct Registries {
    server_name: String,
    pub clients: HashMap<ClientId, Client>,
    pub channels: HashMap<String, Channel>,
}

impl Registries {
    fn new(server_name: String) -> Self {
        Self {
            server_name,
            clients: HashMap::new(),
            channels: HashMap::new(),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Whether any other connection currently holds this nickname.
    ///
    /// Half-registered connections count too, so two clients can never
    /// converge on the same name by registering in parallel.
    pub fn nick_in_use(&self, nick: &str, exclude: ClientId) -> bool {
        self.clients
            .values()
            .any(|c| c.id != exclude && c.nick == nick)
    }

    /// Resolve a nickname (case-sensitive exact match).
    pub fn find_by_nick(&self, nick: &str) -> Option<&Client> {
        self.clients
            .values()
            .find(|c| !c.nick.is_empty() && c.nick == nick)
    }

    /// Remove one membership, maintaining channel lifecycle invariants.
    ///
    /// Drops the channel if it empties; otherwise announces any operator
    /// hand-off to the remaining members as a server-originated MODE.
    pub fn remove_from_channel(&mut self, name: &str, id: ClientId) {
        if let Some(client) = self.clients.get_mut(&id) {
            client.channels.remove(name);
        }
        let Some(channel) = self.channels.get_mut(name) else {
            return;
        };
        let removal = channel.remove_member(id);
        if removal.empty {
            self.channels.remove(name);
            debug!(channel = %name, "channel emptied and dropped");
            return;
        }
        if let Some(promoted) = removal.promoted {
            let nick = self
                .clients
                .get(&promoted)
                .map(|c| c.nick.clone())
                .unwrap_or_default();
            let notice =
                Message::from(Command::MODE(name.to_string(), "+o".to_string(), Some(nick)))
                    .with_prefix(Prefix::ServerName(self.server_name.clone()));
            if let Some(channel) = self.channels.get(name) {
                fanout(&self.clients, channel, &notice, None);
            }
            info!(channel = %name, promoted = %promoted, "operator hand-off");
        }
    }

    /// Destroy a client entity: broadcast its departure to every channel it
    /// belongs to, remove each membership, and drop its outbound queue.
    ///
    /// With `notify_self` the departing client also receives the QUIT notice
    /// and a closing ERROR line (the QUIT command path); transport-initiated
    /// teardown skips them since the socket is already gone.
    pub fn remove_client(&mut self, id: ClientId, reason: &str, notify_self: bool) {
        let Some(client) = self.clients.remove(&id) else {
            return;
        };
        let quit =
            Message::from(Command::QUIT(Some(reason.to_string()))).with_prefix(client.prefix());

        let mut names: Vec<String> = client.channels.iter().cloned().collect();
        names.sort();
        for name in &names {
            // The departing client is already out of the registry, so the
            // broadcast reaches only the remaining members.
            if let Some(channel) = self.channels.get(name) {
                fanout(&self.clients, channel, &quit, None);
            }
            self.remove_from_channel(name, id);
        }

        if notify_self {
            client.send(quit);
            client.send(Message::from(Command::ERROR(format!(
                "Closing Link: {} ({})",
                client.addr.ip(),
                reason
            ))));
        }
        info!(id = %id, nick = %client.display_nick(), reason = %reason, "client removed");
    }
}

/// The session orchestrator: exclusive owner of both registries.
pub struct Hub {
    pub config: Config,
    next_id: AtomicU64,
    inner: Mutex<Registries>,
}

impl Hub {
    pub fn new(config: Config) -> Self {
        let registries = Registries::new(config.server.name.clone());
        Self {
            config,
            next_id: AtomicU64::new(1),
            inner: Mutex::new(registries),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.config.server.name
    }

    /// Take the registry lock.
    pub fn lock(&self) -> MutexGuard<'_, Registries> {
        self.inner.lock()
    }

    /// Create the client entity for a freshly accepted connection.
    ///
    /// Returns the connection identity and the receiving end of the
    /// client's outbound queue.
    pub fn register_client(
        &self,
        addr: SocketAddr,
    ) -> (ClientId, mpsc::UnboundedReceiver<Message>) {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().clients.insert(id, Client::new(id, addr, tx));
        (id, rx)
    }

    /// Transport-initiated teardown (read error, EOF, protocol violation).
    pub fn handle_disconnect(&self, id: ClientId, reason: &str) {
        self.inner.lock().remove_client(id, reason, false);
    }

    /// Whole-process shutdown: notify everyone, then release all state.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        info!(clients = inner.clients.len(), "shutting down");
        let notice = Message::from(Command::ERROR(
            "Closing Link: Server shutting down".to_string(),
        ));
        for client in inner.clients.values() {
            client.send(notice.clone());
        }
        inner.clients.clear();
        inner.channels.clear();
    }
}
