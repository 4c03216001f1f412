use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};

use pulse_hub::auth::{AuthGate, StaticTokenVerifier};
use pulse_hub::config::ServerConfig;
use pulse_hub::core::{ConnectionRegistry, HeartbeatClock};
use pulse_hub::handlers::{routes, HubState};

#[tokio::main]
async fn main() {
    // Initialize env
    match dotenvy::dotenv() {
        Ok(_) => info!("Environment variables loaded from .env file"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Initialize logging
    env_logger::init();

    // Load config from the environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, heartbeat={:?}",
        config.host, config.port, config.heartbeat_interval
    );

    // Accepted tokens for the static verifier, comma-separated
    let accepted: HashSet<String> = std::env::var("PULSE_HUB_TOKENS")
        .unwrap_or_default()
        .split(',')
        .filter(|t| !t.is_empty())
        .map(|t| t.trim().to_string())
        .collect();

    if accepted.is_empty() {
        warn!("PULSE_HUB_TOKENS is empty: every upgrade attempt will be rejected");
    }

    let verifier = Arc::new(StaticTokenVerifier::new(accepted));
    let gate = Arc::new(AuthGate::new(verifier, config.cookie_secret.clone()));
    let registry = Arc::new(ConnectionRegistry::new());

    // Liveness sweeps run for the lifetime of the server
    let _clock = HeartbeatClock::new(registry.clone(), config.heartbeat_interval).spawn();

    let state = HubState::new(registry, gate);

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    // Start the server
    info!("Starting Pulse Hub server on {}", addr);

    warp::serve(routes(state)).run(addr).await;
}
