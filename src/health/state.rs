//! Liveness and readiness derivation.
//!
//! # States
//! - Ready: at least one scrape succeeded, and either the breaker is closed
//!   or the last success is younger than the staleness bound
//! - NotReady: no success yet, or a sustained outage outlived the staleness bound
//!
//! Half-open is still an outage: the failure count has not been reset by a
//! successful trial, so it is treated like open here.

use tokio::time::Instant;

use crate::resilience::BreakerStatus;
use crate::state::ExporterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Healthy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Carries the reason reported on the readiness endpoint.
    NotReady(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Read-only health view over the exporter state.
pub struct HealthState<'a> {
    state: &'a ExporterState,
}

impl<'a> HealthState<'a> {
    pub fn of(state: &'a ExporterState) -> Self {
        Self { state }
    }

    pub fn liveness(&self) -> Liveness {
        Liveness::Healthy
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness_at(Instant::now())
    }

    pub fn readiness_at(&self, now: Instant) -> Readiness {
        let entry = self.state.cache.read();
        let Some(last_success) = entry.last_success_at else {
            return Readiness::NotReady("no successful scrape yet".to_string());
        };

        let breaker = self.state.breaker.snapshot_at(now);
        let age = now.duration_since(last_success);
        if breaker.status == BreakerStatus::Closed || age < self.state.staleness {
            return Readiness::Ready;
        }

        Readiness::NotReady(format!(
            "last success {}s ago, failures: {}",
            age.as_secs(),
            breaker.consecutive_failures
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::BreakerConfig;
    use crate::upstream::{ActivitySnapshot, ScrapeFailure, ScrapeOutcome};
    use std::time::{Duration, SystemTime};

    fn state(staleness: Duration) -> ExporterState {
        ExporterState::new(
            BreakerConfig {
                failure_threshold: 5,
                cooldown: Duration::from_secs(60),
            },
            staleness,
        )
    }

    fn fail(state: &ExporterState, times: usize, now: Instant) {
        let failure = ScrapeOutcome::Failure(ScrapeFailure::Connection("refused".into()));
        for _ in 0..times {
            state.breaker.record_at(&failure, now);
        }
    }

    fn succeed(state: &ExporterState, now: Instant) {
        let snapshot = ActivitySnapshot::default();
        state.breaker.record_at(&ScrapeOutcome::Success(snapshot), now);
        state.cache.update_at(snapshot, now, SystemTime::now());
    }

    #[test]
    fn test_liveness_always_healthy() {
        let state = state(Duration::from_secs(60));
        fail(&state, 10, Instant::now());
        assert_eq!(HealthState::of(&state).liveness(), Liveness::Healthy);
    }

    #[test]
    fn test_not_ready_before_first_success() {
        let state = state(Duration::from_secs(60));
        let now = Instant::now();
        assert!(!HealthState::of(&state).readiness_at(now).is_ready());

        fail(&state, 2, now);
        assert_eq!(
            HealthState::of(&state).readiness_at(now),
            Readiness::NotReady("no successful scrape yet".to_string())
        );
    }

    #[test]
    fn test_ready_right_after_first_success() {
        let state = state(Duration::from_secs(60));
        let now = Instant::now();
        fail(&state, 5, now);
        succeed(&state, now);
        assert_eq!(HealthState::of(&state).readiness_at(now), Readiness::Ready);
    }

    #[test]
    fn test_open_breaker_ready_until_stale() {
        let state = state(Duration::from_secs(60));
        let t0 = Instant::now();
        succeed(&state, t0);

        let outage = t0 + Duration::from_secs(10);
        fail(&state, 5, outage);
        let health = HealthState::of(&state);

        assert_eq!(health.readiness_at(outage), Readiness::Ready);
        assert_eq!(
            health.readiness_at(t0 + Duration::from_secs(59)),
            Readiness::Ready
        );
        assert_eq!(
            health.readiness_at(t0 + Duration::from_secs(60)),
            Readiness::NotReady("last success 60s ago, failures: 5".to_string())
        );
    }

    #[test]
    fn test_half_open_breaker_is_not_ready_when_stale() {
        let state = state(Duration::from_secs(60));
        let t0 = Instant::now();
        succeed(&state, t0);

        for secs in [40, 70, 100, 130, 160] {
            fail(&state, 1, t0 + Duration::from_secs(secs));
        }
        let health = HealthState::of(&state);

        // Opened at t0+160s; the cooldown ends at t0+220s.
        let open = t0 + Duration::from_secs(200);
        assert_eq!(state.breaker.status_at(open), BreakerStatus::Open);
        assert!(!health.readiness_at(open).is_ready());

        for secs in [229, 235] {
            let half_open = t0 + Duration::from_secs(secs);
            assert_eq!(state.breaker.status_at(half_open), BreakerStatus::HalfOpen);
            assert_eq!(
                health.readiness_at(half_open),
                Readiness::NotReady(format!("last success {}s ago, failures: 5", secs))
            );
        }

        // A successful trial closes the breaker and restores readiness.
        succeed(&state, t0 + Duration::from_secs(240));
        assert_eq!(
            health.readiness_at(t0 + Duration::from_secs(240)),
            Readiness::Ready
        );
    }

    #[test]
    fn test_half_open_breaker_ready_while_fresh() {
        let state = state(Duration::from_secs(600));
        let t0 = Instant::now();
        succeed(&state, t0);
        fail(&state, 5, t0 + Duration::from_secs(10));

        let half_open = t0 + Duration::from_secs(80);
        assert_eq!(state.breaker.status_at(half_open), BreakerStatus::HalfOpen);
        assert_eq!(HealthState::of(&state).readiness_at(half_open), Readiness::Ready);
    }

    #[test]
    fn test_closed_breaker_stays_ready_with_old_success() {
        let state = state(Duration::from_secs(60));
        let t0 = Instant::now();
        succeed(&state, t0);
        fail(&state, 4, t0 + Duration::from_secs(120));

        assert_eq!(
            HealthState::of(&state).readiness_at(t0 + Duration::from_secs(150)),
            Readiness::Ready
        );
    }
}
