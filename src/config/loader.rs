//! Configuration loading and layering.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::args::Args;
use crate::config::schema::ExporterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML config file. Does not validate; see [`resolve`].
pub fn load_config(path: &Path) -> Result<ExporterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Defaults, then the config file, then flags/env; normalized and validated.
pub fn resolve(args: &Args) -> Result<ExporterConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ExporterConfig::default(),
    };

    args.apply(&mut config);
    normalize(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn normalize(config: &mut ExporterConfig) {
    config.upstream.url = config.upstream.url.trim().trim_end_matches('/').to_string();
    config.upstream.api_key = config.upstream.api_key.trim().to_string();
    config.observability.log_level = config.observability.log_level.trim().to_lowercase();
}
