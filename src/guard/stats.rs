use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for guard decisions.
#[derive(Debug, Default)]
pub struct GuardStats {
    pub total_checks: AtomicU64,
    pub accepted: AtomicU64,
    pub rejected: AtomicU64,
    pub swept: AtomicU64,
    pub sweep_runs: AtomicU64,
}

impl GuardStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_accepted(&self) {
        self.total_checks.fetch_add(1, Ordering::Relaxed);
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.total_checks.fetch_add(1, Ordering::Relaxed);
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sweep(&self, removed: u64) {
        self.sweep_runs.fetch_add(1, Ordering::Relaxed);
        self.swept.fetch_add(removed, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_checks: self.total_checks.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
            sweep_runs: self.sweep_runs.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_checks: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub swept: u64,
    pub sweep_runs: u64,
}

impl StatsSnapshot {
    pub fn duplicate_rate(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.rejected as f64 / self.total_checks as f64
        }
    }
}
