//! Ticket intake: submission validation, the queued message, and processing.

mod message;
mod processor;
mod validator;

pub use message::TicketMessage;
pub use processor::{
    submitter_confirmation, team_summary, BatchFailure, BatchReport, DispatchReport,
    IntakeError, IntakeProcessor, ProcessOutcome, SUBMITTER_EMAIL_SUBJECT,
    TEAM_NOTIFICATION_SUBJECT,
};
pub use validator::{
    validate, validate_at, RawSubmission, ValidatedRequest, ValidationError,
    MAX_DESCRIPTION_CHARS, MAX_TITLE_WORDS,
};
