use order_guard::guard::Decision;
use order_guard::observability::{
    mask_amount, mask_sensitive, AggregatedHealth, DependencyHealth, HealthStatus, LatencyTimer,
    LogConfig, LogFormat, Metrics,
};
use rust_decimal::Decimal;

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(config.include_target);
    assert!(!config.include_file);
    assert!(!config.include_line);
}

#[test]
fn test_log_format_from_str() {
    assert_eq!(LogFormat::from("json"), LogFormat::Json);
    assert_eq!(LogFormat::from("COMPACT"), LogFormat::Compact);
    assert_eq!(LogFormat::from("unknown"), LogFormat::Pretty);
}

#[test]
fn test_mask_sensitive_exact_boundary() {
    assert_eq!(mask_sensitive("123456", 3), "******");
}

#[test]
fn test_mask_phone_keeps_ends() {
    let masked = mask_sensitive("+6281234567890", 3);
    assert!(masked.starts_with("+62"));
    assert!(masked.ends_with("890"));
    assert_eq!(masked.chars().count(), 14);
}

#[test]
fn test_mask_amount_negative() {
    assert_eq!(mask_amount(&Decimal::from(-5_000_000)), "***M+");
    assert_eq!(mask_amount(&Decimal::from(50_000)), "***K+");
}

#[test]
fn test_metrics_guard_recording() {
    let metrics = Metrics::new();
    metrics.record_guard_decision(&Decision::Accepted);
    metrics.record_guard_decision(&Decision::Rejected {
        elapsed_minutes: 3,
        remaining_minutes: 27,
    });
    metrics.record_guard_check_latency(0.2);
    metrics.record_guard_sweep(4);
    metrics.set_tracked_keys(12);
}

#[test]
fn test_metrics_http_request() {
    let metrics = Metrics::new();
    metrics.record_http_request("POST", "/api/check-duplicate", 200, 1.0);
    metrics.record_http_request("POST", "/api/check-duplicate", 429, 0.8);
    metrics.record_http_request("GET", "/health", 200, 0.3);
}

#[test]
fn test_latency_timer() {
    let timer = LatencyTimer::new();
    std::thread::sleep(std::time::Duration::from_millis(10));
    let elapsed = timer.elapsed_ms();
    assert!(elapsed >= 10.0);
}

#[test]
fn test_dependency_health_unhealthy() {
    let health = DependencyHealth::unhealthy("duplicate_guard", "Cache lock poisoned");
    assert_eq!(health.status, HealthStatus::Unhealthy);
    assert!(health.latency_ms.is_none());
    assert_eq!(health.message, Some("Cache lock poisoned".to_string()));
}

#[test]
fn test_aggregated_health_all_healthy() {
    let health = AggregatedHealth::new(
        "0.1.0".to_string(),
        42,
        vec![DependencyHealth::healthy("duplicate_guard", 0.01)],
    );
    assert_eq!(health.status, HealthStatus::Healthy);
    assert_eq!(health.uptime_seconds, 42);

    let json = serde_json::to_value(&health).unwrap();
    assert_eq!(json["status"], "healthy");
}
