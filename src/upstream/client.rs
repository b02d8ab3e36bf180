//! HTTP client for the Tautulli activity API.

use std::time::Duration;

use tokio::time;
use url::Url;

use crate::upstream::types::parse_activity;
use crate::upstream::{ActivitySnapshot, ActivitySource, ScrapeFailure, ScrapeOutcome};

/// API path appended to the configured base URL.
pub const API_PATH: &str = "api/v2";

/// Command name for the current-activity call.
pub const ACTIVITY_CMD: &str = "get_activity";

/// Error building the client at startup.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Polls `{base_url}/api/v2?apikey=...&cmd=get_activity`.
pub struct TautulliClient {
    endpoint: Url,
    api_key: String,
    http: reqwest::Client,
}

impl TautulliClient {
    pub fn new(base_url: &Url, api_key: impl Into<String>) -> Result<Self, ClientBuildError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("plex-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            endpoint: activity_endpoint(base_url)?,
            api_key: api_key.into(),
            http,
        })
    }

    /// Endpoint without credentials, safe to log.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn request(&self, timeout: Duration) -> Result<ActivitySnapshot, ScrapeFailure> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[("apikey", self.api_key.as_str()), ("cmd", ACTIVITY_CMD)])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeFailure::Connection(format!("HTTP status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        parse_activity(&body)
    }
}

impl ActivitySource for TautulliClient {
    async fn fetch(&self, timeout: Duration) -> ScrapeOutcome {
        tracing::debug!(endpoint = %self.endpoint, "Fetching activity");

        match time::timeout(timeout, self.request(timeout)).await {
            Ok(result) => result.into(),
            Err(_) => ScrapeOutcome::Failure(ScrapeFailure::Timeout(timeout)),
        }
    }
}

/// Join the fixed API path onto the base, keeping any path prefix the base has.
pub fn activity_endpoint(base_url: &Url) -> Result<Url, url::ParseError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(API_PATH)
}

// The request URL carries the API key in its query; strip it before it can reach a log line.
fn classify_transport_error(err: reqwest::Error, timeout: Duration) -> ScrapeFailure {
    if err.is_timeout() {
        return ScrapeFailure::Timeout(timeout);
    }
    if err.is_decode() {
        return ScrapeFailure::MalformedResponse(err.without_url().to_string());
    }
    ScrapeFailure::Connection(err.without_url().to_string())
}
