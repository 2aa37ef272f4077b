//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Intake (submissions, validation failures, stored tickets, urgency)
//! - Queue (redeliveries, dead letters)
//! - Side channels (notification and email failures)
//! - Staleness sweeper (flagged tickets, per-requester failures)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Intake Metrics
// =============================================================================

/// Submissions accepted onto the queue.
pub static TICKETS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "helpdesk_tickets_submitted_total",
        "Total submissions validated and enqueued",
    )
    .unwrap()
});

/// Submissions rejected by validation, by reason.
pub static VALIDATION_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "helpdesk_validation_failures_total",
            "Total submissions rejected by validation",
        ),
        &["reason"], // "missing_field", "invalid_format", "exceeds_limit", "malformed_body"
    )
    .unwrap()
});

/// Tickets processed by the intake processor, by upsert outcome.
pub static TICKETS_STORED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("helpdesk_tickets_stored_total", "Total tickets processed"),
        &["outcome"], // "inserted", "already_exists", "failed"
    )
    .unwrap()
});

/// Urgency level distribution of processed tickets.
pub static URGENCY_LEVELS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "helpdesk_urgency_levels_total",
            "Processed tickets by assigned urgency level",
        ),
        &["level"], // "1" .. "5"
    )
    .unwrap()
});

/// Time spent processing one queued message.
pub static PROCESSING_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "helpdesk_processing_duration_seconds",
            "Duration of processing one queued ticket",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Queue Metrics
// =============================================================================

/// Messages put back on the queue after a retryable failure.
pub static QUEUE_REDELIVERIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "helpdesk_queue_redeliveries_total",
        "Total queued messages redelivered after a failure",
    )
    .unwrap()
});

/// Messages dropped after exhausting their deliveries or failing permanently.
pub static QUEUE_DEAD_LETTERS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "helpdesk_queue_dead_letters_total",
        "Total queued messages dropped without being processed",
    )
    .unwrap()
});

// =============================================================================
// Side Channel Metrics
// =============================================================================

/// Best-effort deliveries that failed or timed out, by channel.
pub static SIDE_EFFECT_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "helpdesk_side_effect_failures_total",
            "Total failed notification or email deliveries",
        ),
        &["channel"], // "notification", "email", "stale_alert"
    )
    .unwrap()
});

// =============================================================================
// Sweeper Metrics
// =============================================================================

/// Tickets flipped from OPEN to STALE.
pub static STALE_TICKETS_FLAGGED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "helpdesk_stale_tickets_flagged_total",
        "Total tickets marked stale",
    )
    .unwrap()
});

/// Requesters or pages the sweeper failed to process.
pub static SWEEP_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "helpdesk_sweep_failures_total",
        "Total sweep failures (per requester or per page)",
    )
    .unwrap()
});

/// Sweep duration in seconds.
pub static SWEEP_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("helpdesk_sweep_duration_seconds", "Duration of staleness sweeps")
            .buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 60.0, 300.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Intake
        Box::new(TICKETS_SUBMITTED.clone()),
        Box::new(VALIDATION_FAILURES.clone()),
        Box::new(TICKETS_STORED.clone()),
        Box::new(URGENCY_LEVELS.clone()),
        Box::new(PROCESSING_DURATION.clone()),
        // Queue
        Box::new(QUEUE_REDELIVERIES.clone()),
        Box::new(QUEUE_DEAD_LETTERS.clone()),
        // Side channels
        Box::new(SIDE_EFFECT_FAILURES.clone()),
        // Sweeper
        Box::new(STALE_TICKETS_FLAGGED.clone()),
        Box::new(SWEEP_FAILURES.clone()),
        Box::new(SWEEP_DURATION.clone()),
    ]
}
