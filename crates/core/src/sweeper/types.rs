use serde::Serialize;

/// One ticket flipped from OPEN to STALE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleEvent {
    pub ticket_id: String,
    pub ticket_title: String,
    pub email: String,
    /// Whole days since creation, rounded down.
    pub age_days: i64,
    pub created_at: i64,
}

/// A requester (or a page of requesters) the sweep could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
    /// `None` when a whole page read failed.
    pub email: Option<String>,
    pub error: String,
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub events: Vec<StaleEvent>,
    pub failures: Vec<SweepFailure>,
    pub requesters_scanned: usize,
    /// True when the scan reached the end of the store.
    pub completed: bool,
    /// Cursor after the last page fully read; pass it to `sweep_from` to resume.
    pub checkpoint: Option<String>,
}

impl SweepReport {
    pub fn stale_count(&self) -> usize {
        self.events.len()
    }

    /// Short human-readable status line.
    pub fn summary(&self) -> String {
        if self.failures.is_empty() && self.completed {
            "Stale ticket count successfully completed.".to_string()
        } else if self.completed {
            format!(
                "Stale ticket count completed with {} failure(s).",
                self.failures.len()
            )
        } else {
            format!(
                "Stale ticket count interrupted after {} requester(s) with {} failure(s).",
                self.requesters_scanned,
                self.failures.len()
            )
        }
    }
}
