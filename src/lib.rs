//! Pulse Hub - an authenticated WebSocket broadcast hub
//!
//! Connections are admitted through a signed-credential gate before the
//! protocol upgrade, tracked in a scope-partitioned registry (global or
//! per-thread rooms), kept honest by a bidirectional one-byte heartbeat,
//! and fanned out to every live member of their scope.

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;

// Re-export main components
pub use config::*;
pub use constants::*;
