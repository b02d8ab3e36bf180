//! Scrape failure taxonomy.

use std::time::Duration;

/// Why a scrape did not produce a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeFailure {
    /// No complete response within the request timeout.
    #[error("request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Transport error or non-success HTTP status.
    #[error("connection error: {0}")]
    Connection(String),

    /// A response arrived but did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Well-formed response whose result field reports an error.
    #[error("upstream reported error: {0}")]
    Upstream(String),

    /// The breaker is open; no call was made.
    #[error("circuit breaker open, scrape skipped")]
    CircuitOpen,
}

impl ScrapeFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeFailure::Timeout(_) => "timeout",
            ScrapeFailure::Connection(_) => "connection_error",
            ScrapeFailure::MalformedResponse(_) => "malformed_response",
            ScrapeFailure::Upstream(_) => "upstream_error",
            ScrapeFailure::CircuitOpen => "circuit_open",
        }
    }

    /// Skipped calls are backpressure, not evidence about the upstream.
    pub fn counts_toward_breaker(&self) -> bool {
        !matches!(self, ScrapeFailure::CircuitOpen)
    }
}
