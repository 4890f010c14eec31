use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::guard::store::DuplicateGuard;

/// Background job that periodically evicts stale submission records.
pub struct GuardSweeper {
    guard: Arc<DuplicateGuard>,
    interval: std::time::Duration,
}

impl GuardSweeper {
    pub fn new(guard: Arc<DuplicateGuard>, interval: std::time::Duration) -> Self {
        Self { guard, interval }
    }

    /// Uses the sweep interval from the guard's own configuration.
    pub fn from_config(guard: Arc<DuplicateGuard>) -> Self {
        let interval = guard
            .config()
            .sweep_interval
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(600));
        Self::new(guard, interval)
    }

    /// Runs a single sweep pass.
    pub fn run_once(&self) -> usize {
        self.guard.sweep_now()
    }

    /// Starts the sweeper in a background task.
    pub fn start(self) -> SweeperHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                interval_secs = self.interval.as_secs(),
                "Duplicate guard sweeper started"
            );

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        self.run_once();
                    }
                }
            }

            tracing::info!("Duplicate guard sweeper stopped");
        });

        SweeperHandle {
            stop_tx: Some(stop_tx),
            join: Some(join),
        }
    }
}

/// Handle to a running sweeper. Dropping it stops the ticker.
pub struct SweeperHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stops the ticker and waits for the task to exit.
    pub async fn shutdown(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                tracing::error!("Duplicate guard sweeper task failed: {}", e);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}
