//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the helpdesk server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Store and queue status (collected dynamically)
//! - Core intake, queue and sweeper metrics (registered from helpdesk_core)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "helpdesk_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("helpdesk_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "helpdesk_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Status Metrics (collected dynamically)
// =============================================================================

/// Requester records in the store.
pub static REQUESTERS_TOTAL: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("helpdesk_requesters", "Requester records in the store").unwrap()
});

/// 1 while the intake queue accepts messages.
pub static QUEUE_OPEN: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("helpdesk_queue_open", "Whether the intake queue is accepting messages")
        .unwrap()
});

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Status
    registry
        .register(Box::new(REQUESTERS_TOTAL.clone()))
        .unwrap();
    registry.register(Box::new(QUEUE_OPEN.clone())).unwrap();

    // Core metrics (intake, queue, side channels, sweeper)
    for metric in helpdesk_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Ok(count) = state.store().count() {
        REQUESTERS_TOTAL.set(count);
    }
    QUEUE_OPEN.set(if state.queue().is_closed() { 0 } else { 1 });
}

static EMAIL_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[^/]+@[^/]+").unwrap());
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace emails and IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = EMAIL_SEGMENT.replace_all(path, "/{email}");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}
