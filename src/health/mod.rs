//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! /healthz → state.rs liveness()  (process is running)
//! /ready   → state.rs readiness() (cache + breaker, evaluated per request)
//! ```
//!
//! # Design Decisions
//! - Liveness never depends on the upstream, so an outage does not restart the pod
//! - Readiness is derived on every call; the verdict itself is never stored
//! - Readiness survives an open breaker until the last success goes stale

pub mod state;

pub use state::{HealthState, Liveness, Readiness};
