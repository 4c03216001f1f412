//! Server-side heartbeat clock
//!
//! One fixed-period task sweeps every registered connection: a peer that
//! has not answered the previous ping is presumed dead and force-closed,
//! everyone else gets their flag cleared and a fresh one-byte ping. The
//! clock keeps no per-connection timers; liveness state lives on the
//! connection itself.

use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::constants::HEARTBEAT_VALUE;
use crate::core::registry::SharedRegistry;
use crate::error::PulseHubError;

/// Periodic liveness sweeper over all registered connections
pub struct HeartbeatClock {
    registry: SharedRegistry,
    period: Duration,
}

impl HeartbeatClock {
    pub fn new(registry: SharedRegistry, period: Duration) -> Self {
        Self { registry, period }
    }

    /// Run one sweep over every connection
    pub async fn sweep(&self) {
        for conn in self.registry.all_connections().await {
            if !conn.is_open() {
                continue;
            }

            if !conn.sweep_alive() {
                // No pong since the last ping: one full period of silence
                warn!("{}", PulseHubError::LivenessTimeout(conn.id().to_string()));
                conn.force_close();
                continue;
            }

            // Flag was just cleared by the sweep; the peer must pong
            // before the next tick to survive it
            if let Err(e) = conn.send_frame(vec![HEARTBEAT_VALUE], true) {
                debug!("Ping failed for {}: {}", conn.id(), e);
            }
        }
    }

    /// Spawn the periodic sweep task. The first tick fires one full period
    /// after startup, so a fresh connection is never closed before it has
    /// seen a ping.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            // interval's first tick completes immediately; skip it so
            // every sweep sits one full period after the previous one
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}
