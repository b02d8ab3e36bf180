//! Per-outcome scrape counters.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::upstream::{ScrapeOutcome, OUTCOME_KINDS};

/// Monotonic counts of scrape outcomes, one slot per kind.
#[derive(Debug, Default)]
pub struct ScrapeStats {
    counts: [AtomicU64; OUTCOME_KINDS.len()],
}

impl ScrapeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: &ScrapeOutcome) {
        let kind = outcome.kind();
        if let Some(slot) = OUTCOME_KINDS.iter().position(|k| *k == kind) {
            self.counts[slot].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Every kind with its count, zeros included.
    pub fn counts(&self) -> Vec<(&'static str, u64)> {
        OUTCOME_KINDS
            .iter()
            .zip(self.counts.iter())
            .map(|(kind, count)| (*kind, count.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }
}
