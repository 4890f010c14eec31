#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use order_guard::api::{create_router, AppState};
use order_guard::guard::{DuplicateGuard, GuardConfig, ManualClock};
use std::sync::Arc;

/// Guard with the default timings driven by a manual clock starting at the epoch.
pub fn setup_guard() -> (Arc<DuplicateGuard>, ManualClock) {
    setup_guard_with(GuardConfig::default())
}

pub fn setup_guard_with(config: GuardConfig) -> (Arc<DuplicateGuard>, ManualClock) {
    let clock = ManualClock::at_epoch();
    let guard = DuplicateGuard::new(config, Arc::new(clock.clone()))
        .expect("Failed to build duplicate guard");
    (Arc::new(guard), clock)
}

pub fn setup_app() -> (axum::Router, Arc<DuplicateGuard>, ManualClock) {
    let (guard, clock) = setup_guard();
    let router = create_router(AppState::new(Arc::clone(&guard)));
    (router, guard, clock)
}

pub fn minutes(n: i64) -> DateTime<Utc> {
    DateTime::<Utc>::default() + Duration::minutes(n)
}
