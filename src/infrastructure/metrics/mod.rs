//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method and status
//! - HTTP request latency histograms
//! - Rate limit decisions by route group and outcome
//! - Tracked rate limit buckets
//! - Snowflakes issued

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

const NAMESPACE: &str = "api_edge";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Rate limit decisions by route group and outcome ("admitted", "rejected")
pub static RATE_LIMIT_DECISIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rate_limit_decisions_total", "Rate limit evaluations").namespace(NAMESPACE),
        &["group", "outcome"],
    )
    .expect("Failed to create RATE_LIMIT_DECISIONS_TOTAL metric")
});

/// Buckets currently tracked by the limiter
pub static RATE_LIMIT_BUCKETS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("rate_limit_buckets", "Tracked rate limit buckets").namespace(NAMESPACE),
    )
    .expect("Failed to create RATE_LIMIT_BUCKETS metric")
});

/// Snowflakes issued
pub static SNOWFLAKES_GENERATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("snowflakes_generated_total", "Snowflake IDs issued").namespace(NAMESPACE),
    )
    .expect("Failed to create SNOWFLAKES_GENERATED_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(RATE_LIMIT_DECISIONS_TOTAL.clone()))
        .expect("Failed to register RATE_LIMIT_DECISIONS_TOTAL");
    registry
        .register(Box::new(RATE_LIMIT_BUCKETS.clone()))
        .expect("Failed to register RATE_LIMIT_BUCKETS");
    registry
        .register(Box::new(SNOWFLAKES_GENERATED_TOTAL.clone()))
        .expect("Failed to register SNOWFLAKES_GENERATED_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, status: u16, duration_secs: f64) {
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, status.as_str()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method])
        .observe(duration_secs);
}

/// Helper to record a rate limit decision and the table size after it
pub fn record_rate_limit_decision(group: &str, admitted: bool, tracked_buckets: usize) {
    let outcome = if admitted { "admitted" } else { "rejected" };
    RATE_LIMIT_DECISIONS_TOTAL
        .with_label_values(&[group, outcome])
        .inc();
    RATE_LIMIT_BUCKETS.set(tracked_buckets as i64);
}

/// Helper to count an issued snowflake
pub fn record_snowflake() {
    SNOWFLAKES_GENERATED_TOTAL.inc();
}
