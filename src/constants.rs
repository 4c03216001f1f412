// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

// Heartbeat protocol constants
/// Reserved one-byte value marking a liveness ping/pong frame on the wire.
/// A binary frame of exactly this single byte is control traffic, never data.
pub const HEARTBEAT_VALUE: u8 = 1;
/// Server ping period in seconds.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 5;
/// Extra slack the client watchdog allows beyond the server period.
pub const CLIENT_WATCHDOG_GRACE_SECS: u64 = 1;

// Credential extraction keys (signed cookie and query parameter share a name)
pub const AT_KEY: &str = "at";
