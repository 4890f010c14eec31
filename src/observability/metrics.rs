use metrics::{counter, gauge, histogram, describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Instant;

use crate::error::{AppError, Result};
use crate::guard::Decision;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INSTALL_LOCK: Mutex<()> = Mutex::new(());

/// Global metrics instance.
pub static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Metrics collector for the duplicate guard service.
#[derive(Debug, Clone, Default)]
pub struct Metrics;

impl Metrics {
    pub fn new() -> Self {
        Self
    }

    pub fn record_guard_decision(&self, decision: &Decision) {
        let label = match decision {
            Decision::Accepted => "accepted",
            Decision::Rejected { .. } => "rejected",
        };
        counter!("duplicate_guard_decisions_total", "decision" => label).increment(1);
    }

    pub fn record_guard_check_latency(&self, duration_ms: f64) {
        histogram!("duplicate_guard_check_duration_ms").record(duration_ms);
    }

    pub fn record_guard_sweep(&self, removed: usize) {
        counter!("duplicate_guard_sweeps_total").increment(1);
        counter!("duplicate_guard_swept_total").increment(removed as u64);
    }

    pub fn set_tracked_keys(&self, count: usize) {
        gauge!("duplicate_guard_tracked_keys").set(count as f64);
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_ms: f64) {
        counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string(), "status" => status.to_string()).increment(1);
        histogram!("http_request_duration_ms", "method" => method.to_string(), "path" => path.to_string()).record(duration_ms);
    }
}

/// Timer for measuring operation latency.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for LatencyTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the Prometheus recorder once and returns its handle.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let _install = INSTALL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to install Prometheus recorder: {}", e)))?;
    describe_metrics();

    METRICS.get_or_init(Metrics::new);
    Ok(METRICS_HANDLE.get_or_init(|| handle).clone())
}

fn describe_metrics() {
    describe_counter!("duplicate_guard_decisions_total", Unit::Count, "Duplicate checks by decision");
    describe_histogram!("duplicate_guard_check_duration_ms", Unit::Milliseconds, "Duplicate check latency in milliseconds");
    describe_counter!("duplicate_guard_sweeps_total", Unit::Count, "Completed sweep passes");
    describe_counter!("duplicate_guard_swept_total", Unit::Count, "Submission records evicted by the sweeper");
    describe_gauge!("duplicate_guard_tracked_keys", Unit::Count, "Submission records currently held in memory");

    describe_counter!("http_requests_total", Unit::Count, "Total HTTP requests");
    describe_histogram!("http_request_duration_ms", Unit::Milliseconds, "HTTP request latency in milliseconds");
}

/// Returns the global metrics instance.
pub fn get_metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}
