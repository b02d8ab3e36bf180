//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with the metrics and probe handlers
//! - Wire up middleware (tracing, request timeout)
//! - Serve on a bound listener until the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::handlers;
use crate::observability::MetricsRenderer;
use crate::state::SharedState;

/// Upper bound on any single probe or metrics request.
const HANDLER_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub exporter: SharedState,
    pub renderer: Arc<MetricsRenderer>,
}

/// HTTP server for the metrics and health endpoints.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(exporter: SharedState, renderer: Arc<MetricsRenderer>) -> Self {
        let state = AppState { exporter, renderer };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/metrics", get(handlers::metrics))
            .route("/healthz", get(handlers::liveness))
            .route("/ready", get(handlers::readiness))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(TimeoutLayer::new(HANDLER_TIMEOUT))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for serving elsewhere or driving directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
