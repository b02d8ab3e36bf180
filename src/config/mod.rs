//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → loader.rs (optional TOML file)
//!     → args.rs (flags / environment variables override)
//!     → validation.rs (semantic checks, all errors collected)
//!     → ExporterConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults except the upstream URL and API key
//! - Missing or invalid values fail startup, never a running scrape

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::Args;
pub use loader::{load_config, resolve, ConfigError};
pub use schema::{ExporterConfig, ListenerConfig, ObservabilityConfig, ScrapeConfig, UpstreamConfig};
pub use validation::{validate_config, ValidationError};
