//! WebSocket connection handle
//! Tracks liveness and open/closed state for a single peer

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Notify};
use uuid::Uuid;
use warp::ws::Message;

use crate::core::scope::Scope;
use crate::error::{PulseHubError, Result};

/// State of a single WebSocket connection.
///
/// The liveness flag is read-and-cleared by the heartbeat sweep and set by
/// the supervisor when a pong arrives, so both live here as atomics rather
/// than behind the registry lock.
pub struct Connection {
    id: String,
    scope: Scope,
    sender: mpsc::UnboundedSender<Message>,
    alive: AtomicBool,
    open: AtomicBool,
    closed: Notify,
    connected_at: Instant,
}

impl Connection {
    /// Create a new connection with a unique ID, initially alive and open
    pub fn new(scope: Scope, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scope,
            sender,
            alive: AtomicBool::new(true),
            open: AtomicBool::new(true),
            closed: Notify::new(),
            connected_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Send a frame to the peer, preserving binary-ness
    pub fn send_frame(&self, data: Vec<u8>, is_binary: bool) -> Result<()> {
        if !self.is_open() {
            return Err(PulseHubError::ConnectionClosed);
        }

        let message = if is_binary {
            Message::binary(data)
        } else {
            Message::text(String::from_utf8_lossy(&data).into_owned())
        };

        // Callers own the diagnostic for a failed send
        self.sender
            .send(message)
            .map_err(|e| PulseHubError::TransportError(e.to_string()))
    }

    /// Record a liveness pong from the peer
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::SeqCst);
    }

    /// Read and clear the liveness flag; returns whether the peer answered
    /// since the previous sweep
    pub fn sweep_alive(&self) -> bool {
        self.alive.swap(false, Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Terminal transition to the closed state. Idempotent: only the first
    /// call sends the close frame and wakes the supervisor.
    pub fn force_close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            // Best-effort close frame; the peer may already be gone
            let _ = self.sender.send(Message::close());
            self.closed.notify_one();
        }
    }

    /// Resolves once the connection has been force-closed
    pub async fn closed(&self) {
        self.closed.notified().await;
    }

    /// Calculate the connection duration
    pub fn connection_duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
