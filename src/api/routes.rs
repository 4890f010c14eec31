use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::guard::DuplicateGuard;
use crate::observability::HealthChecker;

pub const CHECK_DUPLICATE_PATH: &str = "/api/check-duplicate";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<DuplicateGuard>,
    pub metrics_handle: Option<PrometheusHandle>,
    pub health_checker: Arc<HealthChecker>,
}

impl AppState {
    pub fn new(guard: Arc<DuplicateGuard>) -> Self {
        let health_checker = Arc::new(HealthChecker::new(Arc::clone(&guard)));
        Self {
            guard,
            metrics_handle: None,
            health_checker,
        }
    }

    /// Adds metrics handle to the state.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

/// Creates the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    // OPTIONS preflight is answered by this layer with 200 and an empty body.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check))
        // Metrics endpoint
        .route("/metrics", get(handlers::metrics_endpoint))
        // Duplicate guard
        .route(
            CHECK_DUPLICATE_PATH,
            post(handlers::check_duplicate).fallback(handlers::method_not_allowed),
        )
        .route_layer(middleware::from_fn(handlers::track_http_metrics))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}
