//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, JSON or pretty)
//!
//! /metrics request:
//!     → metrics.rs reads cache + breaker + scrape stats
//!     → sets gauges on a process-local Prometheus recorder
//!     → renders the text exposition format
//! ```
//!
//! # Design Decisions
//! - Gauges are derived from the cache on every render, never pushed by the loop
//! - The recorder is owned, not installed globally, so each exporter renders only its own state
//! - Structured fields instead of formatted strings in log events

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::MetricsRenderer;
