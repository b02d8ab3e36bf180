//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → bind listener → subscribe shutdown receivers
//!     → spawn signal watcher → build upstream client + shared state
//!     → spawn scrape loop → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → scrape loop stops ticking, server drains → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core state, then listener
//! - Fail fast: any startup error is fatal
//! - An in-flight scrape is bounded by its timeout, never force-cancelled

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
