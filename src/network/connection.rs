//! Per-connection event loop.
//!
//! Each connection owns a framed transport and the receiving end of its
//! outbound queue. The loop selects between inbound frames and queued
//! replies; inbound lines are drained in arrival order, which is what
//! guarantees per-connection command ordering.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use tinirc_proto::{Command, LineCodec, Message};

use crate::handlers::{self, DispatchResult};
use crate::state::Hub;

/// Drive one client connection until teardown.
pub async fn run(hub: Arc<Hub>, stream: TcpStream, addr: SocketAddr) {
    let (id, mut rx) = hub.register_client(addr);
    info!(%addr, %id, "client connected");

    let codec = LineCodec::with_max_len(hub.config.limits.max_line_len);
    let mut framed = Framed::new(stream, codec);

    loop {
        tokio::select! {
            queued = rx.recv() => match queued {
                Some(msg) => {
                    if let Err(e) = framed.send(msg).await {
                        debug!(%id, error = %e, "write failed");
                        hub.handle_disconnect(id, "Write error");
                        break;
                    }
                }
                // Entity destroyed and queue fully drained
                None => break,
            },

            frame = framed.next() => match frame {
                Some(Ok(line)) => match handlers::handle_line(&hub, id, &line) {
                    DispatchResult::Continue => {}
                    DispatchResult::Disconnect(reason) => {
                        debug!(%id, ?reason, "disconnecting");
                        break;
                    }
                },
                Some(Err(e)) => {
                    // Framing violations (oversized line, invalid UTF-8) and
                    // I/O errors are fatal to the connection
                    warn!(%id, %addr, error = %e, "read error");
                    let notice = Message::from(Command::ERROR(format!(
                        "Closing Link: {} ({})",
                        addr.ip(),
                        e
                    )));
                    let _ = framed.send(notice).await;
                    hub.handle_disconnect(id, "Read error");
                    break;
                }
                None => {
                    info!(%id, %addr, "client disconnected");
                    hub.handle_disconnect(id, "Connection closed");
                    break;
                }
            }
        }
    }

    // Deliver anything queued during teardown (QUIT echo, closing ERROR)
    // before the socket drops
    while let Ok(msg) = rx.try_recv() {
        if framed.send(msg).await.is_err() {
            break;
        }
    }
}
