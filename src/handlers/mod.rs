//! HTTP/WebSocket request handlers

pub mod websocket;

// Re-export main components
pub use websocket::{routes, HubState};
