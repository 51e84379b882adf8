//! HTTP surface of the kubeintent agent.
//!
//! | Route | Method | Purpose |
//! |---|---|---|
//! | `/apply` | POST | validate and dispatch one intent document |
//! | `/context` | GET | node and pod inventory |
//! | `/health` | GET | liveness probe, plain `ok` |
//! | `/status` | GET | uptime, version, request count |

mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use kubeintent_core::{ActionDispatcher, StatusReporter};
use kubeintent_shared::{ClusterGateway, KubeIntentError, Result};

/// Version reported on `/status`.
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: ActionDispatcher,
    pub status: Arc<StatusReporter>,
}

impl AppState {
    /// Fresh state over `gateway`, with the request counter at zero.
    pub fn new(gateway: Arc<dyn ClusterGateway>) -> Self {
        Self {
            dispatcher: ActionDispatcher::new(gateway),
            status: Arc::new(StatusReporter::new(VERSION)),
        }
    }
}

/// Build the agent's router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/apply", post(routes::apply))
        .route("/context", get(routes::context))
        .route("/health", get(routes::health))
        .route("/status", get(routes::status))
        .with_state(state)
}

/// Serve the agent on `bind` until Ctrl-C.
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| KubeIntentError::Network(format!("cannot bind {bind}: {e}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| KubeIntentError::Network(e.to_string()))?;

    info!(
        addr = %local_addr,
        gateway = state.dispatcher.gateway().name(),
        version = VERSION,
        "agent listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| KubeIntentError::Network(format!("server error: {e}")))?;

    info!("agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
