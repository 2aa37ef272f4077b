//! Testing utilities and mock implementations.
//!
//! Mocks for every external collaborator so intake, the sweeper and the HTTP
//! surface can be exercised without a mail relay or webhook endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk_core::testing::{MockMailer, MockNotifier, MockRequesterStore};
//!
//! let notifier = MockNotifier::new();
//! notifier.set_failing(true).await;
//!
//! // Use in IntakeProcessor / StalenessSweeper...
//! ```

mod mock_notifier;
mod mock_store;

pub use mock_notifier::{MockMailer, MockNotifier, PublishedMessage};
pub use mock_store::MockRequesterStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::intake::{RawSubmission, TicketMessage};

    /// A submission that passes validation.
    pub fn raw_submission() -> RawSubmission {
        RawSubmission {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            ticket_title: Some("Printer not working".to_string()),
            problem_type: Some("Hardware".to_string()),
            ticket_description: Some("The office printer is not working since Monday".to_string()),
        }
    }

    /// A queued message as produced by intake.
    pub fn ticket_message(ticket_id: &str, email: &str, created_at: i64) -> TicketMessage {
        TicketMessage {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            ticket_id: ticket_id.to_string(),
            email: email.to_string(),
            ticket_title: "System down".to_string(),
            problem_type: "software".to_string(),
            ticket_description: "Nothing loads after the update".to_string(),
            created_at: Some(created_at),
        }
    }
}
