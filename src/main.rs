//! tinircd - a minimal line-oriented IRC-style chat server.

mod config;
mod error;
mod handlers;
mod network;
mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::network::Listener;
use crate::state::Hub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tinircd: {}", e);
            eprintln!("usage: tinircd <port> <password>");
            std::process::exit(1);
        }
    };

    info!(
        server = %config.server.name,
        network = %config.server.network,
        port = config.port,
        "Starting tinircd"
    );

    let hub = Arc::new(Hub::new(config));
    let listener = Listener::bind(Arc::clone(&hub)).await?;

    tokio::select! {
        result = listener.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            hub.shutdown();
            // Connection tasks flush their closing notices before the
            // runtime is torn down
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        }
    }

    Ok(())
}
