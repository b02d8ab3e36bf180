//! Shared exporter state.
//!
//! One instance per process, created at startup and passed by `Arc` to the
//! scrape loop (the only writer) and the HTTP handlers (readers).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::resilience::{BreakerConfig, CircuitBreaker};
use crate::scrape::{MetricsCache, ScrapeStats};

pub type SharedState = Arc<ExporterState>;

pub struct ExporterState {
    pub breaker: CircuitBreaker,
    pub cache: MetricsCache,
    pub stats: ScrapeStats,
    /// How long after the last success readiness survives an open breaker.
    pub staleness: Duration,
    pub started_at: Instant,
}

impl ExporterState {
    pub fn new(breaker: BreakerConfig, staleness: Duration) -> Self {
        Self {
            breaker: CircuitBreaker::new(breaker),
            cache: MetricsCache::new(),
            stats: ScrapeStats::new(),
            staleness,
            started_at: Instant::now(),
        }
    }

    pub fn shared(breaker: BreakerConfig, staleness: Duration) -> SharedState {
        Arc::new(Self::new(breaker, staleness))
    }
}
