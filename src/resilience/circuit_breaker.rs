//! Circuit breaker for the upstream activity API.
//!
//! # States
//! - Closed: scrapes call upstream
//! - Open: upstream assumed down, scrapes are skipped
//! - Half-Open: cooldown elapsed, the next scrape is a trial call
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures reaches threshold
//! Open → Half-Open: cooldown elapsed since opened_at
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails (cooldown restarts)
//! ```
//!
//! # Design Decisions
//! - Single breaker for the single upstream
//! - The cooldown is the only way out of Open; there is no manual reset
//! - Skipped scrapes do not count as failures
//! - Every operation has an `_at(now)` form so transitions are testable without sleeping

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::upstream::ScrapeOutcome;

/// Breaker tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive failures that open the breaker.
    pub failure_threshold: u32,
    /// How long the breaker stays open before allowing a trial call.
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerStatus {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerStatus::Closed => "closed",
            BreakerStatus::Open => "open",
            BreakerStatus::HalfOpen => "half_open",
        }
    }
}

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub consecutive_failures: u32,
    pub status: BreakerStatus,
    pub opened_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct State {
    consecutive_failures: u32,
    /// Set exactly while consecutive_failures >= threshold.
    opened_at: Option<Instant>,
}

/// Consecutive-failure circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State::default()),
        }
    }

    pub fn config(&self) -> BreakerConfig {
        self.config
    }

    /// Whether a scrape may call upstream now.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    pub fn allow_at(&self, now: Instant) -> bool {
        self.status_at(now) != BreakerStatus::Open
    }

    /// Feed a scrape outcome into the breaker.
    pub fn record(&self, outcome: &ScrapeOutcome) {
        self.record_at(outcome, Instant::now());
    }

    pub fn record_at(&self, outcome: &ScrapeOutcome, now: Instant) {
        let mut state = self.state.lock();
        match outcome {
            ScrapeOutcome::Success(_) => {
                let was_open = state.opened_at.take().is_some();
                state.consecutive_failures = 0;
                if was_open {
                    tracing::info!("Circuit breaker closed after successful trial scrape");
                }
            }
            ScrapeOutcome::Failure(failure) if !failure.counts_toward_breaker() => {}
            ScrapeOutcome::Failure(_) => {
                state.consecutive_failures = state.consecutive_failures.saturating_add(1);
                if state.consecutive_failures < self.config.failure_threshold {
                    return;
                }

                let cooling_down = state
                    .opened_at
                    .is_some_and(|at| now.duration_since(at) < self.config.cooldown);
                if !cooling_down {
                    state.opened_at = Some(now);
                    tracing::warn!(
                        consecutive_failures = state.consecutive_failures,
                        cooldown_secs = self.config.cooldown.as_secs(),
                        "Circuit breaker opened"
                    );
                }
            }
        }
    }

    pub fn status(&self) -> BreakerStatus {
        self.status_at(Instant::now())
    }

    pub fn status_at(&self, now: Instant) -> BreakerStatus {
        let state = self.state.lock();
        self.status_of(&state, now)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state.lock().consecutive_failures
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> BreakerSnapshot {
        let state = self.state.lock();
        BreakerSnapshot {
            consecutive_failures: state.consecutive_failures,
            status: self.status_of(&state, now),
            opened_at: state.opened_at,
        }
    }

    fn status_of(&self, state: &State, now: Instant) -> BreakerStatus {
        match state.opened_at {
            None => BreakerStatus::Closed,
            Some(at) if now.duration_since(at) < self.config.cooldown => BreakerStatus::Open,
            Some(_) => BreakerStatus::HalfOpen,
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{ActivitySnapshot, ScrapeFailure};

    fn success() -> ScrapeOutcome {
        ScrapeOutcome::Success(ActivitySnapshot::default())
    }

    fn failure() -> ScrapeOutcome {
        ScrapeOutcome::Failure(ScrapeFailure::Connection("refused".into()))
    }

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(BreakerConfig {
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_failures_increment_and_success_resets() {
        let cb = breaker();
        let now = Instant::now();

        for expected in 1..=4 {
            cb.record_at(&failure(), now);
            assert_eq!(cb.consecutive_failures(), expected);
            assert_eq!(cb.status_at(now), BreakerStatus::Closed);
        }

        cb.record_at(&success(), now);
        assert_eq!(cb.consecutive_failures(), 0);
        assert_eq!(cb.status_at(now), BreakerStatus::Closed);
    }

    #[test]
    fn test_opens_exactly_at_threshold() {
        let cb = breaker();
        let now = Instant::now();

        for _ in 0..4 {
            cb.record_at(&failure(), now);
        }
        assert!(cb.allow_at(now));

        cb.record_at(&failure(), now);
        assert_eq!(cb.status_at(now), BreakerStatus::Open);
        assert!(!cb.allow_at(now));
        assert!(!cb.allow_at(now + Duration::from_secs(59)));
        assert!(cb.allow_at(now + Duration::from_secs(60)));
        assert_eq!(
            cb.status_at(now + Duration::from_secs(60)),
            BreakerStatus::HalfOpen
        );
    }

    #[test]
    fn test_skipped_scrapes_do_not_count() {
        let cb = breaker();
        let now = Instant::now();
        for _ in 0..5 {
            cb.record_at(&failure(), now);
        }
        cb.record_at(&ScrapeOutcome::Failure(ScrapeFailure::CircuitOpen), now);
        assert_eq!(cb.consecutive_failures(), 5);

        let closed = breaker();
        closed.record_at(&ScrapeOutcome::Failure(ScrapeFailure::CircuitOpen), now);
        assert_eq!(closed.consecutive_failures(), 0);
    }

    #[test]
    fn test_trial_failure_reopens_and_restarts_cooldown() {
        let cb = breaker();
        let opened = Instant::now();
        for _ in 0..5 {
            cb.record_at(&failure(), opened);
        }

        let trial = opened + Duration::from_secs(61);
        assert!(cb.allow_at(trial));
        cb.record_at(&failure(), trial);

        let snapshot = cb.snapshot_at(trial);
        assert_eq!(snapshot.status, BreakerStatus::Open);
        assert_eq!(snapshot.opened_at, Some(trial));
        assert_eq!(snapshot.consecutive_failures, 6);
        assert!(!cb.allow_at(trial + Duration::from_secs(30)));
        assert!(cb.allow_at(trial + Duration::from_secs(60)));
    }

    #[test]
    fn test_trial_success_closes() {
        let cb = breaker();
        let opened = Instant::now();
        for _ in 0..5 {
            cb.record_at(&failure(), opened);
        }

        let trial = opened + Duration::from_secs(60);
        cb.record_at(&success(), trial);

        let snapshot = cb.snapshot_at(trial);
        assert_eq!(snapshot.status, BreakerStatus::Closed);
        assert_eq!(snapshot.consecutive_failures, 0);
        assert_eq!(snapshot.opened_at, None);
    }

    #[test]
    fn test_failure_during_cooldown_keeps_opened_at() {
        let cb = breaker();
        let opened = Instant::now();
        for _ in 0..5 {
            cb.record_at(&failure(), opened);
        }
        cb.record_at(&failure(), opened + Duration::from_secs(10));
        assert_eq!(cb.snapshot_at(opened).opened_at, Some(opened));
    }
}
