//! Last-known-good activity cache.

use std::time::SystemTime;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::upstream::ActivitySnapshot;

/// The single cached scrape result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// Most recent successful snapshot. Never cleared by a failure.
    pub snapshot: Option<ActivitySnapshot>,
    /// Monotonic time of the most recent success.
    pub last_success_at: Option<Instant>,
    /// Wall-clock time of the most recent success, for exposition.
    pub last_success_wall: Option<SystemTime>,
    /// Monotonic time the most recent scrape finished, successful or not.
    pub last_attempt_at: Option<Instant>,
}

impl CacheEntry {
    /// True when the most recent attempt is the most recent success.
    pub fn is_up(&self) -> bool {
        matches!(
            (self.last_success_at, self.last_attempt_at),
            (Some(success), Some(attempt)) if success >= attempt
        )
    }
}

/// Holds the last successful snapshot and serves it through outages.
#[derive(Debug, Default)]
pub struct MetricsCache {
    entry: Mutex<CacheEntry>,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a fresh successful one.
    pub fn update(&self, snapshot: ActivitySnapshot) {
        self.update_at(snapshot, Instant::now(), SystemTime::now());
    }

    pub fn update_at(&self, snapshot: ActivitySnapshot, now: Instant, wall: SystemTime) {
        let mut entry = self.entry.lock();
        entry.snapshot = Some(snapshot);
        entry.last_success_at = Some(now);
        entry.last_success_wall = Some(wall);
        entry.last_attempt_at = Some(now);
    }

    /// Keep the previous snapshot after a failed scrape.
    pub fn retain(&self) {
        tracing::trace!("Retaining last known snapshot");
    }

    /// Note that a scrape attempt finished at `now`.
    pub fn record_attempt(&self, now: Instant) {
        self.entry.lock().last_attempt_at = Some(now);
    }

    /// Consistent copy of the entry.
    pub fn read(&self) -> CacheEntry {
        self.entry.lock().clone()
    }
}
