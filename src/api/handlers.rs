use axum::{
    extract::{rejection::JsonRejection, MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::requests::CheckDuplicateRequest;
use crate::api::responses::{CheckDuplicateResponse, ErrorResponse};
use crate::error::AppError;
use crate::guard::Decision;
use crate::observability::{get_metrics, mask_amount, mask_sensitive, AggregatedHealth, LatencyTimer};

use super::routes::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<AggregatedHealth> {
    Json(state.health_checker.check_all())
}

/// Readiness check endpoint.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    if state.health_checker.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Liveness check endpoint.
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Prometheus scrape endpoint.
pub async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match &state.metrics_handle {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ============================================================================
// Duplicate Check
// ============================================================================

/// Accepts a submission unless the same phone and amount were accepted within the cooldown.
pub async fn check_duplicate(
    State(state): State<AppState>,
    payload: Result<Json<CheckDuplicateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckDuplicateResponse>), HandlerError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected malformed duplicate check body: {}", rejection);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(rejection.body_text())),
        )
    })?;

    let key = request.submission_key().map_err(error_response)?;

    let timer = LatencyTimer::new();
    let decision = state.guard.check(&key).map_err(error_response)?;
    get_metrics().record_guard_check_latency(timer.elapsed_ms());

    let status = match decision {
        Decision::Accepted => StatusCode::OK,
        Decision::Rejected { .. } => StatusCode::TOO_MANY_REQUESTS,
    };

    tracing::debug!(
        phone = %request.phone.as_deref().map(|p| mask_sensitive(p, 3)).unwrap_or_default(),
        amount = %request.amount.as_ref().map(mask_amount).unwrap_or_default(),
        duplicate = decision.is_duplicate(),
        "Duplicate check completed"
    );

    Ok((status, Json(CheckDuplicateResponse::from(decision))))
}

/// Any method other than POST or OPTIONS on the check endpoint.
pub async fn method_not_allowed() -> HandlerError {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
}

fn error_response(error: AppError) -> HandlerError {
    if error.is_client_error() {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error.to_string())));
    }

    tracing::error!("Duplicate check failed: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(error.to_string())),
    )
}

/// Records request count and latency per matched route.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let timer = LatencyTimer::new();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    get_metrics().record_http_request(&method, &path, response.status().as_u16(), timer.elapsed_ms());
    response
}
