//! Queue payload carrying one validated submission to the processor.

use serde::{Deserialize, Serialize};

use super::ValidatedRequest;

/// Message enqueued by intake and consumed by [`super::IntakeProcessor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketMessage {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub ticket_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub ticket_title: String,
    #[serde(default)]
    pub problem_type: String,
    #[serde(default)]
    pub ticket_description: String,
    /// Epoch seconds; the processor substitutes its own clock when absent.
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl From<ValidatedRequest> for TicketMessage {
    fn from(request: ValidatedRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            ticket_id: request.ticket_id,
            email: request.email,
            ticket_title: request.ticket_title,
            problem_type: request.problem_type.as_str().to_string(),
            ticket_description: request.ticket_description,
            created_at: Some(request.created_at),
        }
    }
}
