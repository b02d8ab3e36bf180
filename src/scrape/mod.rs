//! Scrape subsystem.
//!
//! # Data Flow
//! ```text
//! scheduler.rs (interval tick)
//!     → breaker allow? → upstream fetch
//!     → breaker record(outcome), stats.rs record(outcome)
//!     → cache.rs update(snapshot) on success, retain() on failure
//!
//! Readers (/metrics, /ready) only ever call cache.rs read().
//! ```
//!
//! # Design Decisions
//! - The cache never forgets a good snapshot; outages serve stale values
//! - One writer (the loop), many readers, one short-lived lock per component

pub mod cache;
pub mod scheduler;
pub mod stats;

pub use cache::{CacheEntry, MetricsCache};
pub use scheduler::{ScrapeLoop, ScrapeSettings, SettingsError, TickReport};
pub use stats::ScrapeStats;
