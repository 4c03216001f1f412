//! Broadcast routing
//!
//! Fans an inbound frame out to every live member of the sender's scope,
//! the sender included. Best-effort at-most-once: a failed send is logged
//! and never aborts delivery to the remaining members.

use log::{trace, warn};

use crate::core::connection::Connection;
use crate::core::registry::SharedRegistry;

/// Routes application payloads to all peers in the sender's scope
#[derive(Clone)]
pub struct BroadcastRouter {
    registry: SharedRegistry,
}

impl BroadcastRouter {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// Deliver `payload` to every open member of the sender's scope.
    /// Returns the number of members the frame was handed to.
    pub async fn route(&self, sender: &Connection, payload: Vec<u8>, is_binary: bool) -> usize {
        let members = self.registry.members_of(sender.scope()).await;

        let mut delivered = 0;
        for member in members {
            // Members that already closed are skipped; their own close
            // handler is responsible for cleanup.
            if !member.is_open() {
                continue;
            }

            match member.send_frame(payload.clone(), is_binary) {
                Ok(()) => {
                    trace!("Frame routed to connection {}", member.id());
                    delivered += 1;
                }
                Err(e) => {
                    warn!("Dropping frame for connection {}: {}", member.id(), e);
                }
            }
        }

        delivered
    }
}
