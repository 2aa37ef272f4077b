//! Idempotent ticket insertion into a requester's ticket list.

use tracing::{debug, info, warn};

use super::{RequesterStore, StoreError};
use crate::ticket::StoredTicket;

/// Conditional-write attempts before a conflict is surfaced to the caller.
pub const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Result of [`upsert_ticket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The ticket was appended to the requester's list.
    Inserted,
    /// A ticket with the same ID was already stored; nothing was written.
    AlreadyExists,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::AlreadyExists => "already_exists",
        }
    }
}

/// Insert `ticket` into the list of the requester identified by `email`.
///
/// Creates the requester record first if it does not exist. Redelivering the
/// same ticket is a no-op reported as [`UpsertOutcome::AlreadyExists`].
/// Concurrent writers are detected through the record version; a lost race is
/// retried against a fresh read.
pub fn upsert_ticket(
    store: &dyn RequesterStore,
    email: &str,
    first_name: &str,
    last_name: &str,
    ticket: StoredTicket,
) -> Result<UpsertOutcome, StoreError> {
    if store.create_if_absent(email, first_name, last_name)? {
        info!("Created requester record for {}", email);
    }

    let mut attempt = 1;
    loop {
        let record = store
            .get(email)?
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;

        if record.has_ticket(&ticket.ticket_id) {
            info!("Ticket {} already exists for {}", ticket.ticket_id, email);
            return Ok(UpsertOutcome::AlreadyExists);
        }

        let mut tickets = record.tickets;
        tickets.push(ticket.clone());

        match store.replace_tickets(email, &tickets, record.version) {
            Ok(version) => {
                debug!(
                    "Ticket {} stored for {} (version {})",
                    ticket.ticket_id, email, version
                );
                return Ok(UpsertOutcome::Inserted);
            }
            Err(e) if e.is_conflict() && attempt < MAX_WRITE_ATTEMPTS => {
                warn!(
                    "Concurrent update on {} while adding {} (attempt {}), retrying",
                    email, ticket.ticket_id, attempt
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
