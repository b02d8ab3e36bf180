//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Scrape tick:
//!     → circuit_breaker.rs allow()? (skip the call while open)
//!     → upstream fetch bounded by the request timeout
//!     → circuit_breaker.rs record(outcome)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No immediate retries; the next scheduled tick is the retry
//! - Circuit breaker bounds load on a degraded upstream

pub mod circuit_breaker;

pub use circuit_breaker::{BreakerConfig, BreakerSnapshot, BreakerStatus, CircuitBreaker};
