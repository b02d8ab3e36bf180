//! Periodic scrape loop.
//!
//! # Responsibilities
//! - Tick on a fixed interval
//! - Consult the breaker, call upstream, record the outcome
//! - Update or retain the cache
//!
//! # Design Decisions
//! - Ticks run inline, so a slow call delays the next tick instead of overlapping it
//! - Missed ticks are skipped, not bursted
//! - An in-flight guard turns concurrent `tick()` calls into `Busy`
//! - Shutdown is only observed between ticks; an in-flight call finishes or times out

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::state::SharedState;
use crate::upstream::{ActivitySource, ScrapeFailure, ScrapeOutcome};

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Rejected loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("scrape interval must be greater than 0")]
    ZeroInterval,

    #[error("request timeout must be greater than 0")]
    ZeroTimeout,
}

/// What a single `tick()` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickReport {
    Completed(ScrapeOutcome),
    /// Another tick was still running; nothing was done.
    Busy,
}

pub struct ScrapeLoop<S> {
    source: S,
    state: SharedState,
    settings: ScrapeSettings,
    in_flight: AtomicBool,
}

impl<S: ActivitySource> ScrapeLoop<S> {
    pub fn new(
        source: S,
        state: SharedState,
        settings: ScrapeSettings,
    ) -> Result<Self, SettingsError> {
        if settings.interval.is_zero() {
            return Err(SettingsError::ZeroInterval);
        }
        if settings.timeout.is_zero() {
            return Err(SettingsError::ZeroTimeout);
        }
        Ok(Self {
            source,
            state,
            settings,
            in_flight: AtomicBool::new(false),
        })
    }

    /// Run until shutdown. The first tick fires immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.settings.interval.as_secs_f64(),
            timeout_secs = self.settings.timeout.as_secs_f64(),
            "Scrape loop starting"
        );

        let mut ticker = time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Scrape loop received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// Run one scrape cycle now.
    pub async fn tick(&self) -> TickReport {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("Previous scrape still in flight, skipping tick");
            return TickReport::Busy;
        }
        let _guard = InFlight(&self.in_flight);

        let outcome = if self.state.breaker.allow() {
            self.source.fetch(self.settings.timeout).await
        } else {
            ScrapeOutcome::Failure(ScrapeFailure::CircuitOpen)
        };

        self.apply(&outcome);
        TickReport::Completed(outcome)
    }

    fn apply(&self, outcome: &ScrapeOutcome) {
        let now = Instant::now();
        let state = &self.state;

        state.breaker.record_at(outcome, now);
        state.stats.record(outcome);
        state.cache.record_attempt(now);

        match outcome {
            ScrapeOutcome::Success(snapshot) => {
                state.cache.update_at(*snapshot, now, SystemTime::now());
                tracing::debug!(
                    total_streams = snapshot.total,
                    direct_streams = snapshot.direct,
                    transcode_streams = snapshot.transcode,
                    video_transcodes = snapshot.transcode_video,
                    audio_transcodes = snapshot.transcode_audio,
                    container_transcodes = snapshot.transcode_container,
                    "Metrics updated"
                );
            }
            ScrapeOutcome::Failure(failure) => {
                state.cache.retain();
                let failures = state.breaker.consecutive_failures();
                let threshold = state.breaker.config().failure_threshold;
                match failure {
                    ScrapeFailure::CircuitOpen => {
                        tracing::debug!(failures, threshold, "Circuit breaker open, scrape skipped");
                    }
                    ScrapeFailure::MalformedResponse(_) => {
                        tracing::error!(
                            error = %failure,
                            failures,
                            threshold,
                            "Scrape failed: upstream response did not match expected shape"
                        );
                    }
                    _ => {
                        tracing::warn!(error = %failure, failures, threshold, "Scrape failed");
                    }
                }
            }
        }
    }
}

/// Clears the in-flight flag even if the tick future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
