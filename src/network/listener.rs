//! TCP listener: accepts incoming connections and spawns handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use super::connection;
use crate::state::Hub;

/// The single listening endpoint.
pub struct Listener {
    listener: TcpListener,
    hub: Arc<Hub>,
}

impl Listener {
    /// Bind the configured port on all interfaces.
    ///
    /// A bind failure is fatal at startup and surfaces as a non-zero exit.
    pub async fn bind(hub: Arc<Hub>) -> anyhow::Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], hub.config.port));
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "listener bound");
        Ok(Self { listener, hub })
    }

    /// Accept connections forever, one task per client.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!(%addr, "connection accepted");
                    let hub = Arc::clone(&self.hub);
                    tokio::spawn(connection::run(hub, stream, addr));
                }
                Err(e) => {
                    // Transient accept errors (e.g. fd exhaustion) do not
                    // take the server down
                    warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
