use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum PulseHubError {
    // Auth errors
    AuthRejected,

    // Connection errors
    TransportError(String),
    ConnectionClosed,
    LivenessTimeout(String),

    // Configuration errors
    ConfigError(String),
}

impl fmt::Display for PulseHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthRejected => write!(f, "Credential rejected: upgrade refused"),
            Self::TransportError(msg) => write!(f, "Transport error: {}", msg),
            Self::ConnectionClosed => write!(f, "Connection closed"),
            Self::LivenessTimeout(id) => write!(f, "Liveness timeout for connection {}", id),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for PulseHubError {}

// Generic result type for Pulse Hub
pub type Result<T> = std::result::Result<T, PulseHubError>;
