//! Per-connection supervision
//!
//! Each admitted WebSocket gets one supervising task that classifies
//! inbound frames (liveness pong vs. application data), drives the
//! OPEN -> CLOSED transition, and unregisters the connection exactly once
//! on the way out, whatever caused the close.

use std::sync::Arc;

use futures_util::sink::SinkExt;
use futures_util::stream::StreamExt;
use log::{debug, error, info};
use tokio::sync::mpsc;
use warp::ws::{Message, WebSocket};

use crate::constants::HEARTBEAT_VALUE;
use crate::core::connection::Connection;
use crate::core::registry::SharedRegistry;
use crate::core::router::BroadcastRouter;
use crate::core::scope::Scope;

/// Is this frame the reserved one-byte liveness token?
///
/// An application payload that happens to be this exact single binary byte
/// is indistinguishable from a pong and is consumed as one; that collision
/// is an accepted limitation of the minimal wire scheme.
fn is_heartbeat(msg: &Message) -> bool {
    msg.is_binary() && msg.as_bytes() == [HEARTBEAT_VALUE]
}

/// Supervise one admitted WebSocket until it closes
pub async fn handle_connection(
    ws: WebSocket,
    scope: Scope,
    registry: SharedRegistry,
    router: BroadcastRouter,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Forward frames queued on the channel out to the socket
    tokio::task::spawn(async move {
        while let Some(message) = rx.recv().await {
            let is_close = message.is_close();
            if let Err(e) = ws_tx.send(message).await {
                debug!("Failed to send WebSocket message: {}", e);
                break;
            }
            if is_close {
                break;
            }
        }
    });

    let conn = Arc::new(Connection::new(scope, tx));
    let conn_id = conn.id().to_string();

    registry.join(conn.clone()).await;
    info!("Client connected: {} (scope: {})", conn_id, conn.scope());
    info!("Current connections: {}", registry.connection_count().await);

    // Inbound frames are processed strictly in order; the select only
    // lets a heartbeat force-close interrupt the stream between frames.
    loop {
        tokio::select! {
            maybe_msg = ws_rx.next() => {
                match maybe_msg {
                    Some(Ok(msg)) => {
                        if msg.is_close() {
                            break;
                        }
                        if msg.is_ping() || msg.is_pong() {
                            // Protocol-level frames; warp answers these itself
                            continue;
                        }

                        if is_heartbeat(&msg) {
                            debug!("Liveness pong from {}", conn_id);
                            conn.mark_alive();
                        } else {
                            let is_binary = msg.is_binary();
                            let delivered = router
                                .route(&conn, msg.into_bytes(), is_binary)
                                .await;
                            debug!("Frame from {} routed to {} members", conn_id, delivered);
                        }
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error on {}: {}", conn_id, e);
                        break;
                    }
                    None => break,
                }
            }
            _ = conn.closed() => {
                // Force-closed by the heartbeat sweep
                break;
            }
        }
    }

    // Terminal transition: no frame is processed past this point. The
    // registry leave is a safe no-op if the sweep already removed us.
    conn.force_close();
    registry.leave(&conn).await;

    info!(
        "Connection closed: {} after {:?}",
        conn_id,
        conn.connection_duration()
    );
    info!("Current connections: {}", registry.connection_count().await);
}
