use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{AppError, Result};
use crate::guard::clock::{Clock, SystemClock};
use crate::guard::key::SubmissionKey;
use crate::guard::stats::GuardStats;
use crate::observability::{get_metrics, mask_sensitive};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Timing configuration for the duplicate guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    /// How long an accepted submission blocks identical ones.
    pub cooldown: Duration,
    /// How often the sweeper runs.
    pub sweep_interval: Duration,
    /// Minimum age at which the sweeper evicts a record. Never below `cooldown`.
    pub sweep_threshold: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::minutes(30),
            sweep_interval: Duration::minutes(10),
            sweep_threshold: Duration::minutes(35),
        }
    }
}

impl GuardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cooldown <= Duration::zero() {
            return Err(AppError::Configuration(
                "cooldown must be positive".to_string(),
            ));
        }
        if self.sweep_interval <= Duration::zero() {
            return Err(AppError::Configuration(
                "sweep interval must be positive".to_string(),
            ));
        }
        if self.sweep_threshold < self.cooldown {
            return Err(AppError::Configuration(format!(
                "sweep threshold ({} min) must not be shorter than the cooldown ({} min)",
                self.sweep_threshold.num_minutes(),
                self.cooldown.num_minutes()
            )));
        }
        Ok(())
    }

    pub fn cooldown_minutes(&self) -> i64 {
        self.cooldown.num_minutes()
    }
}

/// Outcome of a duplicate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// No live record existed; the submission is now recorded.
    Accepted,
    /// A live record exists. The record is left untouched.
    Rejected {
        elapsed_minutes: i64,
        remaining_minutes: i64,
    },
}

impl Decision {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Decision::Rejected { .. })
    }
}

/// In-memory, time-windowed guard against repeated order submissions.
///
/// All reads and writes go through one mutex, so a check and the insert that
/// follows it are atomic with respect to other checks and to the sweeper.
pub struct DuplicateGuard {
    records: Mutex<HashMap<SubmissionKey, DateTime<Utc>>>,
    config: GuardConfig,
    clock: Arc<dyn Clock>,
    stats: Arc<GuardStats>,
}

impl DuplicateGuard {
    pub fn new(config: GuardConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            records: Mutex::new(HashMap::new()),
            config,
            clock,
            stats: Arc::new(GuardStats::new()),
        })
    }

    pub fn with_system_clock(config: GuardConfig) -> Result<Self> {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn stats(&self) -> Arc<GuardStats> {
        Arc::clone(&self.stats)
    }

    /// Checks `key` against the injected clock's current time.
    pub fn check(&self, key: &SubmissionKey) -> Result<Decision> {
        self.check_and_record(key, self.clock.now())
    }

    /// Rejects `key` if it was accepted less than one cooldown ago, otherwise
    /// records it at `now` and accepts.
    pub fn check_and_record(&self, key: &SubmissionKey, now: DateTime<Utc>) -> Result<Decision> {
        let mut records = self.records.lock().map_err(|e| {
            AppError::Internal(anyhow::anyhow!("duplicate guard cache unavailable: {}", e))
        })?;

        if let Some(recorded_at) = records.get(key) {
            // A record stamped in the future (clock stepped back) counts as brand new.
            let age_ms = (now - *recorded_at).num_milliseconds().max(0);
            let cooldown_ms = self.config.cooldown.num_milliseconds();

            if age_ms < cooldown_ms {
                let decision = Decision::Rejected {
                    elapsed_minutes: age_ms / MILLIS_PER_MINUTE,
                    remaining_minutes: (cooldown_ms - age_ms + MILLIS_PER_MINUTE - 1)
                        / MILLIS_PER_MINUTE,
                };
                drop(records);

                self.stats.record_rejected();
                get_metrics().record_guard_decision(&decision);
                tracing::info!(
                    key = %mask_sensitive(key.as_str(), 3),
                    age_ms,
                    "Duplicate submission rejected"
                );
                return Ok(decision);
            }
        }

        records.insert(key.clone(), now);
        let tracked = records.len();
        drop(records);

        self.stats.record_accepted();
        get_metrics().record_guard_decision(&Decision::Accepted);
        get_metrics().set_tracked_keys(tracked);
        tracing::debug!(
            key = %mask_sensitive(key.as_str(), 3),
            tracked,
            "Submission accepted"
        );
        Ok(Decision::Accepted)
    }

    /// Removes every record older than the sweep threshold. Returns how many were removed.
    ///
    /// Best effort: a poisoned lock is recovered instead of failing the pass.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let threshold = self.config.sweep_threshold;
        let mut records = self.lock_recovering();

        let before = records.len();
        records.retain(|_, recorded_at| now - *recorded_at <= threshold);
        let tracked = records.len();
        drop(records);

        let removed = before - tracked;
        self.stats.record_sweep(removed as u64);
        get_metrics().record_guard_sweep(removed);
        get_metrics().set_tracked_keys(tracked);

        if removed > 0 {
            tracing::info!(removed, tracked, "Swept expired submission records");
        }
        removed
    }

    /// Sweeps using the injected clock's current time.
    pub fn sweep_now(&self) -> usize {
        self.sweep(self.clock.now())
    }

    /// Timestamp of the last accepted submission for `key`, if still tracked.
    pub fn last_accepted(&self, key: &SubmissionKey) -> Option<DateTime<Utc>> {
        self.lock_recovering().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.lock_recovering().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// False once a panic while holding the cache lock has poisoned it.
    pub fn is_healthy(&self) -> bool {
        !self.records.is_poisoned()
    }

    /// Panics on another thread while holding the cache lock, leaving it poisoned.
    #[cfg(test)]
    pub(crate) fn poison(self: &Arc<Self>) {
        let guard = Arc::clone(self);
        let _ = std::thread::spawn(move || {
            let _lock = guard.records.lock();
            panic!("poison the cache");
        })
        .join();
    }

    fn lock_recovering(&self) -> MutexGuard<'_, HashMap<SubmissionKey, DateTime<Utc>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
