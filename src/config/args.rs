//! Command-line flags and environment variables.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::ExporterConfig;
use crate::observability::LogFormat;

/// Every flag is optional here; required values are enforced by validation
/// after the config file and defaults have been merged in.
#[derive(Debug, Default, Parser)]
#[command(name = "plex-exporter")]
#[command(version, about = "Prometheus exporter for Plex activity reported by Tautulli", long_about = None)]
pub struct Args {
    /// Optional TOML config file; flags and environment override it.
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Tautulli base URL, e.g. http://tautulli:8181
    #[arg(long, env = "TAUTULLI_URL")]
    pub tautulli_url: Option<String>,

    /// Tautulli API key
    #[arg(long, env = "TAUTULLI_API_KEY", hide_env_values = true)]
    pub tautulli_api_key: Option<String>,

    /// Per-scrape request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Interface for the metrics and health listener
    #[arg(long, env = "METRICS_HOST")]
    pub metrics_host: Option<String>,

    /// Port for the metrics and health listener
    #[arg(long, env = "METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Seconds between scrapes
    #[arg(long, env = "SCRAPE_INTERVAL")]
    pub scrape_interval: Option<u64>,

    /// Consecutive failures that open the circuit breaker
    #[arg(long, env = "CIRCUIT_BREAKER_THRESHOLD")]
    pub breaker_threshold: Option<u32>,

    /// Seconds the circuit breaker stays open before a trial scrape
    #[arg(long, env = "CIRCUIT_BREAKER_COOLDOWN")]
    pub breaker_cooldown: Option<u64>,

    /// Seconds after the last success that readiness survives an open breaker
    #[arg(long, env = "READINESS_STALENESS")]
    pub readiness_staleness: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Args {
    /// Overlay every value that was given onto `config`.
    pub fn apply(&self, config: &mut ExporterConfig) {
        if let Some(url) = &self.tautulli_url {
            config.upstream.url = url.clone();
        }
        if let Some(key) = &self.tautulli_api_key {
            config.upstream.api_key = key.clone();
        }
        if let Some(timeout) = self.request_timeout {
            config.upstream.timeout_secs = timeout;
        }
        if let Some(host) = &self.metrics_host {
            config.listener.host = host.clone();
        }
        if let Some(port) = self.metrics_port {
            config.listener.port = port;
        }
        if let Some(interval) = self.scrape_interval {
            config.scrape.interval_secs = interval;
        }
        if let Some(threshold) = self.breaker_threshold {
            config.scrape.failure_threshold = threshold;
        }
        if let Some(cooldown) = self.breaker_cooldown {
            config.scrape.cooldown_secs = cooldown;
        }
        if let Some(staleness) = self.readiness_staleness {
            config.scrape.staleness_secs = Some(staleness);
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}
