//! Connection registry partitioned by broadcast scope
//!
//! The registry is the only shared mutable state in the hub. Join, leave,
//! and snapshot reads are serialized through one RwLock so a broadcast
//! never observes torn membership; sends happen on snapshots outside the
//! lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::connection::Connection;
use crate::core::scope::Scope;

#[derive(Default)]
struct RegistryInner {
    /// Members of the implicit global scope, in join order
    global: Vec<Arc<Connection>>,
    /// Members of each named thread room, in join order. An entry exists
    /// only while the room has at least one member.
    threads: HashMap<String, Vec<Arc<Connection>>>,
}

/// Holds all live connections, partitioned into their broadcast scopes.
/// A connection belongs to exactly one scope for its whole lifetime.
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Add a connection to the scope it was created with. Re-joining the
    /// same connection id is a no-op, preserving the one-scope invariant.
    pub async fn join(&self, conn: Arc<Connection>) {
        let mut inner = self.inner.write().await;

        let members = match conn.scope() {
            Scope::Global => &mut inner.global,
            Scope::Thread(id) => inner.threads.entry(id.clone()).or_default(),
        };

        if members.iter().any(|m| m.id() == conn.id()) {
            return;
        }

        members.push(conn);
    }

    /// Remove a connection from its scope. Safe to call more than once:
    /// a connection that is already gone (e.g. a forced termination raced
    /// with the natural close path) is a no-op. A thread room left empty
    /// is deleted; the global scope always remains.
    pub async fn leave(&self, conn: &Connection) {
        let mut inner = self.inner.write().await;

        match conn.scope() {
            Scope::Global => {
                inner.global.retain(|m| m.id() != conn.id());
            }
            Scope::Thread(id) => {
                if let Some(members) = inner.threads.get_mut(id) {
                    members.retain(|m| m.id() != conn.id());
                    if members.is_empty() {
                        inner.threads.remove(id);
                    }
                }
            }
        }
    }

    /// Point-in-time snapshot of a scope's members, for fan-out
    pub async fn members_of(&self, scope: &Scope) -> Vec<Arc<Connection>> {
        let inner = self.inner.read().await;

        match scope {
            Scope::Global => inner.global.clone(),
            Scope::Thread(id) => inner.threads.get(id).cloned().unwrap_or_default(),
        }
    }

    /// Snapshot of every connection regardless of scope, for the heartbeat
    /// sweep
    pub async fn all_connections(&self) -> Vec<Arc<Connection>> {
        let inner = self.inner.read().await;

        let mut all = inner.global.clone();
        for members in inner.threads.values() {
            all.extend(members.iter().cloned());
        }
        all
    }

    /// Total number of live connections
    pub async fn connection_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.global.len() + inner.threads.values().map(|m| m.len()).sum::<usize>()
    }

    /// Number of thread rooms with at least one member
    pub async fn thread_count(&self) -> usize {
        self.inner.read().await.threads.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Shared reference to the registry
pub type SharedRegistry = Arc<ConnectionRegistry>;
