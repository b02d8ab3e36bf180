//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the optional
//! TOML config file; command-line flags and environment variables are
//! layered on top by `loader.rs`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::LogFormat;
use crate::resilience::BreakerConfig;
use crate::scrape::ScrapeSettings;

/// Root configuration for the exporter.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ExporterConfig {
    /// Tautulli connection settings.
    pub upstream: UpstreamConfig,

    /// Metrics/health listener.
    pub listener: ListenerConfig,

    /// Scrape loop, breaker and readiness tuning.
    pub scrape: ScrapeConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl ExporterConfig {
    pub fn scrape_settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            interval: Duration::from_secs(self.scrape.interval_secs),
            timeout: Duration::from_secs(self.upstream.timeout_secs),
        }
    }

    pub fn breaker(&self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self.scrape.failure_threshold,
            cooldown: Duration::from_secs(self.scrape.cooldown_secs),
        }
    }

    /// Readiness staleness bound; defaults to two scrape intervals.
    pub fn staleness(&self) -> Duration {
        let secs = self
            .scrape
            .staleness_secs
            .unwrap_or_else(|| self.scrape.interval_secs.saturating_mul(2));
        Duration::from_secs(secs)
    }
}

/// Tautulli connection settings.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL, e.g. "http://tautulli:8181". The API path is appended.
    pub url: String,

    /// Tautulli API key, sent as the `apikey` query parameter.
    pub api_key: String,

    /// Per-scrape request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

// Hand-written so the key never ends up in a log line.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("url", &self.url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port serving /metrics, /healthz and /ready.
    pub port: u16,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Scrape loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Seconds between scrapes.
    pub interval_secs: u64,

    /// Consecutive failures that open the circuit breaker.
    pub failure_threshold: u32,

    /// Seconds the breaker stays open before a trial scrape.
    pub cooldown_secs: u64,

    /// Seconds after the last success that readiness survives an open breaker.
    pub staleness_secs: Option<u64>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            failure_threshold: 5,
            cooldown_secs: 60,
            staleness_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}
