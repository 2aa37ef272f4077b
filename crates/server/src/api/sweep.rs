//! Manual trigger for the staleness sweep.

use axum::{extract::State, Json};
use chrono::Utc;
use helpdesk_core::{StaleEvent, SweepFailure};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Response for a sweep run
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub stale_tickets_processed: String,
    pub stale_count: usize,
    pub requesters_scanned: usize,
    pub completed: bool,
    pub checkpoint: Option<String>,
    pub events: Vec<StaleEvent>,
    pub failures: Vec<SweepFailure>,
}

/// Run the sweep now and return its report
pub async fn trigger_sweep(State(state): State<Arc<AppState>>) -> Json<SweepResponse> {
    let report = state.sweeper().run(Utc::now()).await;

    Json(SweepResponse {
        stale_tickets_processed: report.summary(),
        stale_count: report.stale_count(),
        requesters_scanned: report.requesters_scanned,
        completed: report.completed,
        checkpoint: report.checkpoint,
        events: report.events,
        failures: report.failures,
    })
}
