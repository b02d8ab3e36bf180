//! Plex activity exporter library.
//!
//! Polls the Tautulli activity API on a fixed interval and republishes
//! session counts as Prometheus gauges, degrading to the last known
//! values while the upstream is unavailable.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod scrape;
pub mod state;
pub mod upstream;

pub use config::ExporterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use state::{ExporterState, SharedState};
