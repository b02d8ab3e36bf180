//! Upstream activity source.
//!
//! # Data Flow
//! ```text
//! ScrapeLoop tick
//!     → client.rs (one GET to {base}/api/v2?cmd=get_activity, bounded by timeout)
//!     → types.rs (decode envelope, classify sessions)
//!     → ScrapeOutcome::Success(ActivitySnapshot) | ScrapeOutcome::Failure(ScrapeFailure)
//! ```
//!
//! # Design Decisions
//! - Exactly one network call per fetch; no retries here
//! - Every failure is typed so the breaker and logs can tell them apart
//! - The API key never appears in errors or logs

pub mod client;
pub mod error;
pub mod types;

use std::future::Future;
use std::time::Duration;

pub use client::TautulliClient;
pub use error::ScrapeFailure;
pub use types::ActivitySnapshot;

/// Result of a single scrape attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Success(ActivitySnapshot),
    Failure(ScrapeFailure),
}

impl ScrapeOutcome {
    /// Label used for the per-outcome scrape counter.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeOutcome::Success(_) => "success",
            ScrapeOutcome::Failure(failure) => failure.kind(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeOutcome::Success(_))
    }
}

impl From<Result<ActivitySnapshot, ScrapeFailure>> for ScrapeOutcome {
    fn from(result: Result<ActivitySnapshot, ScrapeFailure>) -> Self {
        match result {
            Ok(snapshot) => ScrapeOutcome::Success(snapshot),
            Err(failure) => ScrapeOutcome::Failure(failure),
        }
    }
}

/// Every outcome kind, in exposition order.
pub const OUTCOME_KINDS: [&str; 6] = [
    "success",
    "timeout",
    "connection_error",
    "malformed_response",
    "upstream_error",
    "circuit_open",
];

/// Something the scrape loop can poll for an activity snapshot.
pub trait ActivitySource: Send + Sync + 'static {
    /// Issue one request bounded by `timeout`.
    fn fetch(&self, timeout: Duration) -> impl Future<Output = ScrapeOutcome> + Send;
}
