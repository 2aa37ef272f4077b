pub mod config;
pub mod intake;
pub mod metrics;
pub mod notify;
pub mod queue;
pub mod store;
pub mod sweeper;
pub mod testing;
pub mod ticket;
pub mod triage;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use intake::{
    validate, validate_at, BatchReport, IntakeError, IntakeProcessor, ProcessOutcome,
    RawSubmission, TicketMessage, ValidatedRequest, ValidationError,
};
pub use notify::{create_mailer, create_notifier, Mailer, Notifier, NotifyError, OutboundEmail};
pub use queue::{create_intake_queue, IntakeConsumer, IntakeQueue, QueueError};
pub use store::{
    upsert_ticket, RecordPage, RequesterRecord, RequesterStore, ScanRequest, SqliteRequesterStore,
    StoreError, UpsertOutcome,
};
pub use sweeper::{StaleEvent, StalenessSweeper, SweepFailure, SweepReport};
pub use ticket::{generate_ticket_id, ProblemType, StoredTicket, TicketStatus};
pub use triage::{score, KeywordTable, KeywordTableError, Urgency, UrgencyScore, UrgencyScorer};
