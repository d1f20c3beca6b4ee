//! Client entity: one per active connection.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use tinirc_proto::{Message, Prefix};
use tokio::sync::mpsc;

/// Opaque connection identity.
///
/// Serves as the join key between the client registry and per-channel
/// membership sets. Identities are never reused; ordering is allocation
/// order, which makes operator hand-off deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-connection state.
///
/// A client is fully registered once it has authenticated and supplied a
/// nickname, username and realname; only then does the dispatcher admit
/// commands beyond PASS/NICK/USER.
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    pub addr: SocketAddr,
    /// Empty until NICK; mutable afterwards.
    pub nick: String,
    /// Empty until USER; immutable once set.
    pub user: String,
    pub realname: String,
    /// Whether PASS succeeded.
    pub authenticated: bool,
    /// Names of every channel this client is a member of.
    pub channels: HashSet<String>,
    /// Outbound queue drained by the owning connection task.
    tx: mpsc::UnboundedSender<Message>,
}

impl Client {
    pub fn new(id: ClientId, addr: SocketAddr, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id,
            addr,
            nick: String::new(),
            user: String::new(),
            realname: String::new(),
            authenticated: false,
            channels: HashSet::new(),
            tx,
        }
    }

    /// The full-registration conjunction.
    pub fn is_registered(&self) -> bool {
        self.authenticated
            && !self.nick.is_empty()
            && !self.user.is_empty()
            && !self.realname.is_empty()
    }

    /// Nickname for addressing replies; `*` before one is set.
    pub fn display_nick(&self) -> &str {
        if self.nick.is_empty() { "*" } else { &self.nick }
    }

    /// Origin prefix for messages attributed to this client.
    pub fn prefix(&self) -> Prefix {
        Prefix::new(
            self.display_nick(),
            self.user.clone(),
            self.addr.ip().to_string(),
        )
    }

    /// Queue a message for delivery.
    ///
    /// A send error means the connection task is already gone; teardown is
    /// in progress, so the message is simply dropped.
    pub fn send(&self, msg: Message) {
        let _ = self.tx.send(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> (Client, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = "10.0.0.1:50000".parse().unwrap();
        (Client::new(ClientId(1), addr, tx), rx)
    }

    #[test]
    fn test_registration_requires_all_four() {
        let (mut client, _rx) = test_client();
        assert!(!client.is_registered());

        client.authenticated = true;
        assert!(!client.is_registered());

        client.nick = "alice".into();
        assert!(!client.is_registered());

        client.user = "al".into();
        assert!(!client.is_registered());

        client.realname = "Alice A".into();
        assert!(client.is_registered());
    }

    #[test]
    fn test_display_nick_placeholder() {
        let (mut client, _rx) = test_client();
        assert_eq!(client.display_nick(), "*");
        client.nick = "alice".into();
        assert_eq!(client.display_nick(), "alice");
    }

    #[test]
    fn test_prefix_rendering() {
        let (mut client, _rx) = test_client();
        client.nick = "alice".into();
        client.user = "al".into();
        assert_eq!(client.prefix().to_string(), "alice!al@10.0.0.1");
    }

    #[test]
    fn test_client_id_ordering_is_allocation_order() {
        assert!(ClientId(1) < ClientId(2));
        assert_eq!(ClientId(7), ClientId(7));
    }
}
