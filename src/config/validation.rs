//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required values present (upstream URL, API key)
//! - Value ranges (interval, timeout, threshold, port)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: &ExporterConfig → Result<(), Vec<ValidationError>>
//! - Runs once at startup; any error is fatal

use url::Url;

use crate::config::schema::ExporterConfig;

/// Shortest scrape interval accepted, in seconds.
pub const MIN_SCRAPE_INTERVAL_SECS: u64 = 5;

/// Shortest API key accepted.
pub const MIN_API_KEY_LEN: usize = 16;

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("TAUTULLI_URL is required")]
    MissingUrl,

    #[error("TAUTULLI_URL '{url}' is not a valid URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("TAUTULLI_URL scheme must be http or https, not '{0}'")]
    UnsupportedScheme(String),

    #[error("TAUTULLI_API_KEY is required")]
    MissingApiKey,

    #[error("TAUTULLI_API_KEY appears to be invalid format")]
    InvalidApiKey,

    #[error("METRICS_PORT 0 is not valid (must be 1-65535)")]
    InvalidPort,

    #[error("SCRAPE_INTERVAL {0} is too low (minimum 5 seconds)")]
    IntervalTooLow(u64),

    #[error("REQUEST_TIMEOUT must be greater than 0")]
    ZeroTimeout,

    #[error("circuit breaker threshold must be at least 1")]
    ZeroThreshold,

    #[error("circuit breaker cooldown must be greater than 0")]
    ZeroCooldown,

    #[error("readiness staleness bound must be greater than 0")]
    ZeroStaleness,

    #[error("LOG_LEVEL '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Check every constraint and collect all violations.
pub fn validate_config(config: &ExporterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.url.is_empty() {
        errors.push(ValidationError::MissingUrl);
    } else if let Err(e) = validate_url(&config.upstream.url) {
        errors.push(e);
    }

    let key = &config.upstream.api_key;
    if key.is_empty() {
        errors.push(ValidationError::MissingApiKey);
    } else if key.len() < MIN_API_KEY_LEN
        || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        errors.push(ValidationError::InvalidApiKey);
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    if config.scrape.interval_secs < MIN_SCRAPE_INTERVAL_SECS {
        errors.push(ValidationError::IntervalTooLow(config.scrape.interval_secs));
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.scrape.failure_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }

    if config.scrape.cooldown_secs == 0 {
        errors.push(ValidationError::ZeroCooldown);
    }

    if config.scrape.staleness_secs == Some(0) {
        errors.push(ValidationError::ZeroStaleness);
    }

    let level = &config.observability.log_level;
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}
