//! Metrics exposition.
//!
//! # Metrics
//! - `plex_active_streams_total` (gauge): all active sessions
//! - `plex_active_streams_direct` (gauge): direct play sessions
//! - `plex_active_streams_transcode` (gauge): sessions transcoding anything
//! - `plex_transcode_{video,audio,container}_sessions` (gauge): per-dimension transcodes
//! - `plex_exporter_up` (gauge): 1 if the most recent scrape succeeded
//! - `plex_exporter_consecutive_failures` (gauge)
//! - `plex_exporter_circuit_open` (gauge): 1 until a success closes the breaker
//! - `plex_exporter_last_success_timestamp_seconds` (gauge): 0 if never
//! - `plex_exporter_scrapes_total` (counter): scrapes by `outcome`
//!
//! The first six names are a contract with dashboards and must not change.

use std::time::UNIX_EPOCH;

use metrics::{counter, describe_counter, describe_gauge, gauge, with_local_recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use parking_lot::Mutex;

use crate::resilience::BreakerStatus;
use crate::state::ExporterState;

pub const ACTIVE_STREAMS_TOTAL: &str = "plex_active_streams_total";
pub const ACTIVE_STREAMS_DIRECT: &str = "plex_active_streams_direct";
pub const ACTIVE_STREAMS_TRANSCODE: &str = "plex_active_streams_transcode";
pub const TRANSCODE_VIDEO_SESSIONS: &str = "plex_transcode_video_sessions";
pub const TRANSCODE_AUDIO_SESSIONS: &str = "plex_transcode_audio_sessions";
pub const TRANSCODE_CONTAINER_SESSIONS: &str = "plex_transcode_container_sessions";

pub const EXPORTER_UP: &str = "plex_exporter_up";
pub const EXPORTER_CONSECUTIVE_FAILURES: &str = "plex_exporter_consecutive_failures";
pub const EXPORTER_CIRCUIT_OPEN: &str = "plex_exporter_circuit_open";
pub const EXPORTER_LAST_SUCCESS: &str = "plex_exporter_last_success_timestamp_seconds";
pub const EXPORTER_SCRAPES_TOTAL: &str = "plex_exporter_scrapes_total";

/// Content type of the text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders exporter state through an owned Prometheus recorder.
pub struct MetricsRenderer {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    // Set-then-render must not interleave between concurrent scrapes.
    render_lock: Mutex<()>,
}

impl MetricsRenderer {
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        with_local_recorder(&recorder, || {
            describe_gauge!(ACTIVE_STREAMS_TOTAL, "Total number of active Plex streams");
            describe_gauge!(ACTIVE_STREAMS_DIRECT, "Number of direct play streams");
            describe_gauge!(ACTIVE_STREAMS_TRANSCODE, "Number of transcoding streams");
            describe_gauge!(TRANSCODE_VIDEO_SESSIONS, "Video transcoding sessions");
            describe_gauge!(TRANSCODE_AUDIO_SESSIONS, "Audio transcoding sessions");
            describe_gauge!(TRANSCODE_CONTAINER_SESSIONS, "Container transcoding sessions");
            describe_gauge!(EXPORTER_UP, "Whether the most recent Tautulli scrape succeeded");
            describe_gauge!(
                EXPORTER_CONSECUTIVE_FAILURES,
                "Consecutive failed Tautulli scrapes"
            );
            describe_gauge!(
                EXPORTER_CIRCUIT_OPEN,
                "Whether the circuit breaker is currently open"
            );
            describe_gauge!(
                EXPORTER_LAST_SUCCESS,
                "Unix time of the last successful Tautulli scrape"
            );
            describe_counter!(EXPORTER_SCRAPES_TOTAL, "Tautulli scrapes by outcome");
        });

        Self {
            recorder,
            handle,
            render_lock: Mutex::new(()),
        }
    }

    /// Render the current state in the text exposition format.
    pub fn render(&self, state: &ExporterState) -> String {
        let _guard = self.render_lock.lock();

        let entry = state.cache.read();
        let breaker = state.breaker.snapshot();
        let counts = state.stats.counts();
        let snapshot = entry.snapshot.unwrap_or_default();
        let last_success = entry
            .last_success_wall
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        with_local_recorder(&self.recorder, || {
            gauge!(ACTIVE_STREAMS_TOTAL).set(snapshot.total as f64);
            gauge!(ACTIVE_STREAMS_DIRECT).set(snapshot.direct as f64);
            gauge!(ACTIVE_STREAMS_TRANSCODE).set(snapshot.transcode as f64);
            gauge!(TRANSCODE_VIDEO_SESSIONS).set(snapshot.transcode_video as f64);
            gauge!(TRANSCODE_AUDIO_SESSIONS).set(snapshot.transcode_audio as f64);
            gauge!(TRANSCODE_CONTAINER_SESSIONS).set(snapshot.transcode_container as f64);

            gauge!(EXPORTER_UP).set(if entry.is_up() { 1.0 } else { 0.0 });
            gauge!(EXPORTER_CONSECUTIVE_FAILURES).set(f64::from(breaker.consecutive_failures));
            // Half-open has not had a successful trial yet; still an outage.
            gauge!(EXPORTER_CIRCUIT_OPEN).set(if breaker.status == BreakerStatus::Closed {
                0.0
            } else {
                1.0
            });
            gauge!(EXPORTER_LAST_SUCCESS).set(last_success);

            for (outcome, count) in counts {
                counter!(EXPORTER_SCRAPES_TOTAL, "outcome" => outcome).absolute(count);
            }
        });

        self.handle.render()
    }
}

impl Default for MetricsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) fn sample(rendered: &str, series: &str) -> Option<f64> {
    rendered.lines().find_map(|line| {
        let (name, value) = line.rsplit_once(' ')?;
        if name == series {
            value.parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::BreakerConfig;
    use crate::upstream::{ActivitySnapshot, ScrapeFailure, ScrapeOutcome};
    use std::time::{Duration, SystemTime};
    use tokio::time::Instant;

    fn state() -> ExporterState {
        ExporterState::new(BreakerConfig::default(), Duration::from_secs(60))
    }

    #[test]
    fn test_renders_zeros_before_first_success() {
        let renderer = MetricsRenderer::new();
        let rendered = renderer.render(&state());

        for name in [
            ACTIVE_STREAMS_TOTAL,
            ACTIVE_STREAMS_DIRECT,
            ACTIVE_STREAMS_TRANSCODE,
            TRANSCODE_VIDEO_SESSIONS,
            TRANSCODE_AUDIO_SESSIONS,
            TRANSCODE_CONTAINER_SESSIONS,
            EXPORTER_UP,
            EXPORTER_LAST_SUCCESS,
        ] {
            assert_eq!(sample(&rendered, name), Some(0.0), "{} in:\n{}", name, rendered);
        }
        assert!(rendered.contains("# HELP plex_active_streams_total Total number of active Plex streams"));
        assert!(rendered.contains("# TYPE plex_active_streams_total gauge"));
    }

    #[test]
    fn test_renders_cached_snapshot() {
        let state = state();
        let snapshot = ActivitySnapshot {
            total: 3,
            direct: 2,
            transcode: 1,
            transcode_video: 1,
            transcode_audio: 0,
            transcode_container: 0,
        };
        let now = Instant::now();
        let outcome = ScrapeOutcome::Success(snapshot);
        state.breaker.record_at(&outcome, now);
        state.stats.record(&outcome);
        state.cache.update_at(snapshot, now, SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000));

        let rendered = MetricsRenderer::new().render(&state);
        assert_eq!(sample(&rendered, ACTIVE_STREAMS_TOTAL), Some(3.0));
        assert_eq!(sample(&rendered, ACTIVE_STREAMS_DIRECT), Some(2.0));
        assert_eq!(sample(&rendered, ACTIVE_STREAMS_TRANSCODE), Some(1.0));
        assert_eq!(sample(&rendered, TRANSCODE_VIDEO_SESSIONS), Some(1.0));
        assert_eq!(sample(&rendered, EXPORTER_UP), Some(1.0));
        assert_eq!(sample(&rendered, EXPORTER_LAST_SUCCESS), Some(1_700_000_000.0));
        assert_eq!(
            sample(&rendered, "plex_exporter_scrapes_total{outcome=\"success\"}"),
            Some(1.0)
        );
        assert_eq!(
            sample(&rendered, "plex_exporter_scrapes_total{outcome=\"timeout\"}"),
            Some(0.0)
        );
    }

    #[test]
    fn test_open_breaker_is_exposed() {
        let state = state();
        let now = Instant::now();
        let failure = ScrapeOutcome::Failure(ScrapeFailure::Connection("refused".into()));
        for _ in 0..5 {
            state.breaker.record_at(&failure, now);
        }

        let rendered = MetricsRenderer::new().render(&state);
        assert_eq!(sample(&rendered, EXPORTER_CIRCUIT_OPEN), Some(1.0));
        assert_eq!(sample(&rendered, EXPORTER_CONSECUTIVE_FAILURES), Some(5.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_breaker_is_exposed_as_open() {
        let state = state();
        let failure = ScrapeOutcome::Failure(ScrapeFailure::Connection("refused".into()));
        for _ in 0..5 {
            state.breaker.record(&failure);
        }

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(state.breaker.status(), BreakerStatus::HalfOpen);

        let rendered = MetricsRenderer::new().render(&state);
        assert_eq!(sample(&rendered, EXPORTER_CIRCUIT_OPEN), Some(1.0));

        state
            .breaker
            .record(&ScrapeOutcome::Success(ActivitySnapshot::default()));
        let rendered = MetricsRenderer::new().render(&state);
        assert_eq!(sample(&rendered, EXPORTER_CIRCUIT_OPEN), Some(0.0));
    }
}
