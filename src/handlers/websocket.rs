//! Upgrade entry point
//!
//! The credential is checked before the protocol upgrade completes: a
//! rejected attempt is answered with 401 Unauthorized and the transport is
//! never upgraded. Admitted sockets get their scope derived from the
//! request path and are handed to the per-connection supervisor.

use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use serde::Serialize;
use warp::http::StatusCode;
use warp::path::FullPath;
use warp::{Filter, Rejection, Reply};

use crate::auth::{AdmitResult, AuthGate, CredentialSource};
use crate::constants::AT_KEY;
use crate::core::registry::SharedRegistry;
use crate::core::router::BroadcastRouter;
use crate::core::scope::Scope;
use crate::core::supervisor::handle_connection;
use crate::error::PulseHubError;

/// Shared handles wired into every request
#[derive(Clone)]
pub struct HubState {
    pub registry: SharedRegistry,
    pub router: BroadcastRouter,
    pub gate: Arc<AuthGate>,
}

impl HubState {
    pub fn new(registry: SharedRegistry, gate: Arc<AuthGate>) -> Self {
        let router = BroadcastRouter::new(registry.clone());
        Self {
            registry,
            router,
            gate,
        }
    }
}

#[derive(Serialize)]
struct HealthStats {
    status: &'static str,
    connections: usize,
    threads: usize,
}

/// Build the full route tree: health check plus the gated upgrade path
/// (any path upgrades; `/thread/<id>` scopes the connection to that room)
pub fn routes(
    state: HubState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(with_state(state.clone()))
        .and_then(health_stats);

    let ws = warp::ws()
        .and(warp::path::full())
        .and(warp::cookie::optional(AT_KEY))
        .and(raw_query_or_empty())
        .and(with_state(state))
        .and_then(gate_upgrade);

    health.or(ws)
}

async fn health_stats(state: HubState) -> Result<impl Reply, Infallible> {
    let stats = HealthStats {
        status: "ok",
        connections: state.registry.connection_count().await,
        threads: state.registry.thread_count().await,
    };
    Ok(warp::reply::json(&stats))
}

async fn gate_upgrade(
    ws: warp::ws::Ws,
    path: FullPath,
    cookie: Option<String>,
    query: String,
    state: HubState,
) -> Result<Box<dyn Reply>, Infallible> {
    let source = CredentialSource {
        cookie,
        query: if query.is_empty() { None } else { Some(query) },
    };

    match state.gate.admit(&source).await {
        AdmitResult::Admitted => {
            let scope = Scope::from_path(path.as_str());
            info!("New websocket connection (scope: {})", scope);

            Ok(Box::new(ws.on_upgrade(move |socket| {
                handle_connection(socket, scope, state.registry, state.router)
            })))
        }
        AdmitResult::Rejected => {
            info!("{}", PulseHubError::AuthRejected);
            Ok(Box::new(warp::reply::with_status(
                "Unauthorized",
                StatusCode::UNAUTHORIZED,
            )))
        }
    }
}

// Helper function to include hub state in a request
fn with_state(state: HubState) -> impl Filter<Extract = (HubState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

// The raw query filter rejects when the URI has no query string at all;
// fold that case into an empty string
fn raw_query_or_empty() -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::query::raw().or_else(|_| async { Ok::<(String,), Rejection>((String::new(),)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenVerifier;
    use crate::core::ConnectionRegistry;
    use std::collections::HashSet;

    fn test_state() -> HubState {
        let verifier = Arc::new(StaticTokenVerifier::new(HashSet::new()));
        let gate = Arc::new(AuthGate::new(
            verifier,
            "handler-test-secret-0123456789abcdef".to_string(),
        ));
        HubState::new(Arc::new(ConnectionRegistry::new()), gate)
    }

    #[tokio::test]
    async fn test_health_reports_counts() {
        let routes = routes(test_state());

        let response = warp::test::request().path("/health").reply(&routes).await;
        assert_eq!(response.status(), 200);

        let body: serde_json::Value =
            serde_json::from_slice(response.body()).expect("health body is JSON");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connections"], 0);
        assert_eq!(body["threads"], 0);
    }

    #[tokio::test]
    async fn test_missing_query_folds_to_empty() {
        let filter = raw_query_or_empty();

        let query = warp::test::request()
            .path("/")
            .filter(&filter)
            .await
            .expect("queryless request still extracts");
        assert_eq!(query, "");

        let query = warp::test::request()
            .path("/?at=tk-1")
            .filter(&filter)
            .await
            .expect("raw query extracts");
        assert_eq!(query, "at=tk-1");
    }
}
