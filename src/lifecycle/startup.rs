//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the upstream client and shared state from validated config
//! - Bind the listener
//! - Start the scrape loop and the HTTP server, stop both together

use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use url::Url;

use crate::config::ExporterConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::MetricsRenderer;
use crate::scrape::{ScrapeLoop, SettingsError};
use crate::state::ExporterState;
use crate::upstream::client::ClientBuildError;
use crate::upstream::TautulliClient;

/// Fatal errors before or while serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Client(#[from] ClientBuildError),

    #[error("invalid scrape settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[source] io::Error),
}

/// Bind the configured address and run until SIGINT/SIGTERM.
pub async fn run(config: ExporterConfig) -> Result<(), StartupError> {
    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    // Subscribe before the signal task exists so an early SIGTERM is not lost.
    let shutdown = Shutdown::new();
    let receivers = Receivers::subscribe(&shutdown);
    signals::spawn_signal_handler(shutdown.clone());

    serve_with(config, listener, shutdown, receivers).await
}

/// Run the exporter on an already bound listener until `shutdown` fires.
pub async fn serve(
    config: ExporterConfig,
    listener: TcpListener,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    let receivers = Receivers::subscribe(&shutdown);
    serve_with(config, listener, shutdown, receivers).await
}

/// Shutdown receivers for the scrape loop and the server.
struct Receivers {
    scrape: broadcast::Receiver<()>,
    server: broadcast::Receiver<()>,
}

impl Receivers {
    fn subscribe(shutdown: &Shutdown) -> Self {
        Self {
            scrape: shutdown.subscribe(),
            server: shutdown.subscribe(),
        }
    }
}

async fn serve_with(
    config: ExporterConfig,
    listener: TcpListener,
    shutdown: Shutdown,
    receivers: Receivers,
) -> Result<(), StartupError> {
    let base_url = Url::parse(&config.upstream.url)?;
    let client = TautulliClient::new(&base_url, config.upstream.api_key.clone())?;
    let settings = config.scrape_settings();
    let breaker = config.breaker();
    let staleness = config.staleness();

    tracing::info!(
        endpoint = %client.endpoint(),
        metrics_address = %listener.local_addr().map_err(StartupError::Serve)?,
        scrape_interval_secs = settings.interval.as_secs(),
        request_timeout_secs = settings.timeout.as_secs(),
        failure_threshold = breaker.failure_threshold,
        cooldown_secs = breaker.cooldown.as_secs(),
        staleness_secs = staleness.as_secs(),
        log_level = %config.observability.log_level,
        "Starting plex exporter"
    );

    let state = ExporterState::shared(breaker, staleness);
    let server = HttpServer::new(state.clone(), Arc::new(MetricsRenderer::new()));

    let scrape = ScrapeLoop::new(client, state, settings)?;
    let scrape_task = tokio::spawn(scrape.run(receivers.scrape));

    tracing::info!("Health endpoints: /healthz (liveness), /ready (readiness), /metrics");
    let served = server.run(listener, receivers.server).await;

    // Stop the loop too if the server exited on its own.
    shutdown.trigger();
    if let Err(e) = scrape_task.await {
        tracing::error!(error = %e, "Scrape loop task failed");
    }

    served.map_err(StartupError::Serve)
}
