//! Main HTTP Gateway Server.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::StatusCode,
    routing::{any, get},
    Router,
};
use exambot_agent::Dispatcher;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::webhook;

pub const HEALTH_PATH: &str = "/healthz";

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub dispatcher: Arc<Dispatcher>,
}

impl GatewayState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

/// Build the router: the webhook on `webhook_path`, the liveness probe, and a
/// plain-text 404 for everything else.
pub fn build_router(state: GatewayState, webhook_path: &str) -> Router {
    let mut app = Router::new().route(webhook_path, any(webhook::handle_update));
    if webhook_path != HEALTH_PATH {
        app = app.route(HEALTH_PATH, get(health));
    }

    app.fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on an already-bound listener until `shutdown` resolves.
/// In-flight requests are allowed to finish.
pub async fn start_server<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "Gateway HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Gateway HTTP server stopped");
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

pub(crate) async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}
