//! Core functionality module

pub mod connection;
pub mod heartbeat;
pub mod registry;
pub mod router;
pub mod scope;
pub mod supervisor;

// Re-export main components
pub use connection::Connection;
pub use heartbeat::HeartbeatClock;
pub use registry::{ConnectionRegistry, SharedRegistry};
pub use router::BroadcastRouter;
pub use scope::Scope;
