//! Consumes queued ticket messages: store, triage, notify.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::TicketMessage;
use crate::metrics::{PROCESSING_DURATION, TICKETS_STORED, URGENCY_LEVELS};
use crate::notify::{spawn_best_effort, Mailer, Notifier, OutboundEmail};
use crate::store::{upsert_ticket, RequesterStore, StoreError, UpsertOutcome};
use crate::ticket::StoredTicket;
use crate::triage::{UrgencyScore, UrgencyScorer};

/// Subject of the internal operations notification.
pub const TEAM_NOTIFICATION_SUBJECT: &str = "New IT Ticket";

/// Subject of the confirmation email sent to the submitter.
pub const SUBMITTER_EMAIL_SUBJECT: &str = "Your IT Ticket has been submitted";

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntakeError {
    /// Whether redelivering the same message could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IntakeError::Store(_))
    }
}

/// Result of processing one message.
///
/// The side-channel deliveries run on their own tasks; their handles are kept
/// so callers can wait for them, but dropping the outcome does not cancel them.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub ticket_id: String,
    pub outcome: UpsertOutcome,
    pub urgency: UrgencyScore,
    notification: JoinHandle<bool>,
    email: JoinHandle<bool>,
}

/// Whether each side-channel delivery succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub notified: bool,
    pub emailed: bool,
}

impl ProcessOutcome {
    /// Wait for both deliveries to finish.
    pub async fn wait(self) -> DispatchReport {
        DispatchReport {
            notified: self.notification.await.unwrap_or(false),
            emailed: self.email.await.unwrap_or(false),
        }
    }
}

/// A message that could not be processed, by position in the batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub index: usize,
    pub ticket_id: String,
    pub error: IntakeError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ProcessOutcome>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Turns queued messages into stored tickets and dispatches the notifications.
pub struct IntakeProcessor {
    store: Arc<dyn RequesterStore>,
    scorer: UrgencyScorer,
    notifier: Arc<dyn Notifier>,
    mailer: Arc<dyn Mailer>,
    notify_timeout: Duration,
    email_timeout: Duration,
}

impl IntakeProcessor {
    pub fn new(
        store: Arc<dyn RequesterStore>,
        scorer: UrgencyScorer,
        notifier: Arc<dyn Notifier>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            scorer,
            notifier,
            mailer,
            notify_timeout: DEFAULT_SEND_TIMEOUT,
            email_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Bound each notification and each email delivery.
    pub fn with_timeouts(mut self, notify_timeout: Duration, email_timeout: Duration) -> Self {
        self.notify_timeout = notify_timeout;
        self.email_timeout = email_timeout;
        self
    }

    /// Process one message against the current clock.
    pub async fn process(&self, message: &TicketMessage) -> Result<ProcessOutcome, IntakeError> {
        self.process_at(message, Utc::now()).await
    }

    /// Process one message. `now` stands in for a missing `created_at`.
    ///
    /// Only storage decides the result. Notification and email are dispatched
    /// for both new and already stored tickets, and their failures are logged
    /// without affecting the returned outcome.
    pub async fn process_at(
        &self,
        message: &TicketMessage,
        now: DateTime<Utc>,
    ) -> Result<ProcessOutcome, IntakeError> {
        let started = Instant::now();
        let result = self.store_and_dispatch(message, now).await;

        let label = if result.is_ok() { "success" } else { "failed" };
        PROCESSING_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());
        if result.is_err() {
            TICKETS_STORED.with_label_values(&["failed"]).inc();
        }
        result
    }

    async fn store_and_dispatch(
        &self,
        message: &TicketMessage,
        now: DateTime<Utc>,
    ) -> Result<ProcessOutcome, IntakeError> {
        if message.email.trim().is_empty() {
            return Err(IntakeError::InvalidMessage("missing email".to_string()));
        }
        if message.ticket_id.trim().is_empty() {
            return Err(IntakeError::InvalidMessage("missing ticket_id".to_string()));
        }

        let ticket = StoredTicket::open(
            &message.ticket_id,
            &message.ticket_title,
            &message.ticket_description,
            &message.problem_type,
            message.created_at.unwrap_or_else(|| now.timestamp()),
        );

        let outcome = self.upsert(message, ticket).await?;
        TICKETS_STORED.with_label_values(&[outcome.as_str()]).inc();

        let urgency = self
            .scorer
            .score(&message.ticket_title, &message.ticket_description);
        let level = urgency.urgency.to_string();
        URGENCY_LEVELS.with_label_values(&[level.as_str()]).inc();

        info!(
            "Processed ticket {} for {} ({}, urgency {})",
            message.ticket_id,
            message.email,
            outcome.as_str(),
            urgency.urgency
        );

        let notification = {
            let notifier = Arc::clone(&self.notifier);
            let body = team_summary(message, &urgency);
            spawn_best_effort("notification", self.notify_timeout, async move {
                notifier.publish(TEAM_NOTIFICATION_SUBJECT, &body).await
            })
        };

        let email = {
            let mailer = Arc::clone(&self.mailer);
            let email = OutboundEmail {
                to: message.email.clone(),
                subject: SUBMITTER_EMAIL_SUBJECT.to_string(),
                body: submitter_confirmation(message, &urgency),
            };
            spawn_best_effort("email", self.email_timeout, async move {
                mailer.send(&email).await
            })
        };

        Ok(ProcessOutcome {
            ticket_id: message.ticket_id.clone(),
            outcome,
            urgency,
            notification,
            email,
        })
    }

    /// Run the blocking store upsert off the async worker threads.
    async fn upsert(
        &self,
        message: &TicketMessage,
        ticket: StoredTicket,
    ) -> Result<UpsertOutcome, StoreError> {
        let store = Arc::clone(&self.store);
        let email = message.email.clone();
        let first_name = message.first_name.clone();
        let last_name = message.last_name.clone();

        tokio::task::spawn_blocking(move || {
            upsert_ticket(store.as_ref(), &email, &first_name, &last_name, ticket)
        })
        .await
        .map_err(|e| StoreError::Database(format!("store task failed: {}", e)))?
    }

    /// Process every message independently. One failure does not stop the rest.
    pub async fn process_batch(&self, messages: &[TicketMessage]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, message) in messages.iter().enumerate() {
            match self.process(message).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    error!("Failed to process ticket {}: {}", message.ticket_id, e);
                    report.failures.push(BatchFailure {
                        index,
                        ticket_id: message.ticket_id.clone(),
                        error: e,
                    });
                }
            }
        }
        debug!(
            "Batch of {} processed, {} failed",
            messages.len(),
            report.failures.len()
        );
        report
    }
}

/// Plain-text summary for the operations team.
pub fn team_summary(message: &TicketMessage, urgency: &UrgencyScore) -> String {
    format!(
        "Hi Team,\n\
         \n\
         Please review the IT Ticket.\n\
         \n\
         Ticket Summary:\n\
         Name: {} {}\n\
         Email: {}\n\
         Ticket ID: {}\n\
         Title: {}\n\
         Ticket Description: {}\n\
         Urgency: {}\n\
         \n\
         Thank you,\n\
         IT Helpdesk",
        message.first_name,
        message.last_name,
        message.email,
        message.ticket_id,
        message.ticket_title,
        message.ticket_description,
        urgency.urgency
    )
}

/// Plain-text confirmation for the submitter.
pub fn submitter_confirmation(message: &TicketMessage, urgency: &UrgencyScore) -> String {
    format!(
        "Hi {},\n\
         \n\
         Your IT ticket has been submitted successfully.\n\
         \n\
         Ticket Summary:\n\
         Ticket ID: {}\n\
         Title: {}\n\
         Ticket Description: {}\n\
         Urgency: {}\n\
         \n\
         Please allow 24 hours for our team to review the ticket. \
         We will notify you once it has been resolved.\n\
         \n\
         Thank you,\n\
         IT Support Team",
        message.first_name,
        message.ticket_id,
        message.ticket_title,
        message.ticket_description,
        urgency.urgency
    )
}
