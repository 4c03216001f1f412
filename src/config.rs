//! Server configuration module
//! Handles dynamic configuration parameters for the hub

use crate::constants::{DEFAULT_HEARTBEAT_SECS, DEFAULT_HOST, DEFAULT_PORT};
use crate::error::{PulseHubError, Result};
use std::env;
use std::time::Duration;

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Period between liveness sweeps; peers must pong within one period
    pub heartbeat_interval: Duration,
    /// Secret backing the signed `at` cookie
    pub cookie_secret: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        panic!("ServerConfig::default() is not allowed: the cookie secret has no safe default. Use ServerConfig::from_env() instead.");
    }
}

impl ServerConfig {
    /// Create a test configuration - only for tests, the secret is public
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            cookie_secret: "test-cookie-secret-0123456789-never-use-in-production".to_string(),
        }
    }

    /// Validate that the cookie secret meets minimum requirements
    fn validate_cookie_secret(secret: &str) -> Result<()> {
        if secret.len() < 32 {
            return Err(PulseHubError::ConfigError(
                "Cookie secret must be at least 32 characters long".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from environment variables if available
    pub fn from_env() -> Result<Self> {
        let host = env::var("PULSE_HUB_HOST").unwrap_or(DEFAULT_HOST.to_string());
        let port = env::var("PULSE_HUB_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let heartbeat_secs = env::var("PULSE_HUB_HEARTBEAT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HEARTBEAT_SECS);

        let cookie_secret = env::var("PULSE_HUB_COOKIE_SECRET")
            .or_else(|_| env::var("COOKIE_SECRET"))
            .map_err(|_| {
                PulseHubError::ConfigError(
                    "COOKIE_SECRET environment variable is required. \
                     Generate one with: openssl rand -base64 32"
                        .to_string(),
                )
            })?;

        Self::validate_cookie_secret(&cookie_secret)?;

        Ok(Self {
            host,
            port,
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
            cookie_secret,
        })
    }
}
