//! Plex activity exporter.
//!
//! Polls Tautulli for current Plex activity and serves the derived gauges
//! in Prometheus format, with liveness and readiness probes.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                    PLEX EXPORTER                     │
//!                 │                                                      │
//!   Tautulli      │  ┌──────────┐   ┌──────────┐   ┌─────────────────┐   │
//!   activity  ◀───┼──│ upstream │◀──│  scrape  │──▶│ circuit breaker │   │
//!   API           │  │  client  │   │   loop   │   └─────────────────┘   │
//!                 │  └──────────┘   └────┬─────┘                         │
//!                 │                      ▼                               │
//!                 │                ┌──────────┐                          │
//!                 │                │  metrics │                          │
//!                 │                │  cache   │                          │
//!                 │                └────┬─────┘                          │
//!                 │          ┌──────────┴──────────┐                     │
//!   Prometheus    │    ┌─────▼─────┐        ┌──────▼──────┐              │
//!   ──────────────┼──▶ │ /metrics  │        │   /ready    │ ◀────────────┼── Orchestrator
//!                 │    │ renderer  │        │  /healthz   │              │
//!                 │    └───────────┘        └─────────────┘              │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use plex_exporter::config::{self, Args, ConfigError};
use plex_exporter::lifecycle::startup;
use plex_exporter::observability::{init_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match config::resolve(&args) {
        Ok(config) => config,
        Err(err) => {
            // Logging is not configured yet; report with defaults.
            let _ = init_logging("info", LogFormat::Json);
            match &err {
                ConfigError::Validation(errors) => {
                    for error in errors {
                        tracing::error!(error = %error, "Invalid configuration");
                    }
                }
                other => tracing::error!(error = %other, "Failed to load configuration"),
            }
            return Err(err.into());
        }
    };

    init_logging(
        &config.observability.log_level,
        config.observability.log_format,
    )?;

    tracing::info!("plex-exporter v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
