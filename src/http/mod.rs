//! HTTP surface subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, trace + timeout layers)
//!     → handlers.rs
//!         /metrics → observability::metrics render
//!         /healthz → health liveness
//!         /ready   → health readiness (200 / 503)
//! ```
//!
//! # Design Decisions
//! - Handlers only read shared state; the scrape loop is the only writer
//! - Nothing here blocks on the upstream

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
