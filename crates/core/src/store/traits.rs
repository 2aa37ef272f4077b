//! Requester record storage trait and types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::StoredTicket;

/// Error type for requester store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record changed since it was read.
    #[error("Write conflict for {email}: expected version {expected}")]
    Conflict { email: String, expected: u64 },

    /// No record exists for the email.
    #[error("Requester not found: {0}")]
    NotFound(String),

    /// The configured store identifier cannot be used as a table name.
    #[error("Invalid store identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Returns true for optimistic-concurrency failures worth retrying.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Stored profile of one ticket submitter, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequesterRecord {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Tickets in submission order.
    pub tickets: Vec<StoredTicket>,
    /// Concurrency token, bumped by the store on every ticket-list write.
    pub version: u64,
}

impl RequesterRecord {
    /// Returns true if a ticket with this ID is already in the list.
    pub fn has_ticket(&self, ticket_id: &str) -> bool {
        self.tickets.iter().any(|t| t.ticket_id == ticket_id)
    }
}

/// One page request of a full-store scan.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Resume after this email (exclusive). `None` starts from the beginning.
    pub after: Option<String>,
    /// Maximum number of records to return.
    pub limit: usize,
}

impl ScanRequest {
    /// Request the first page.
    pub fn first(limit: usize) -> Self {
        Self { after: None, limit }
    }

    /// Request the page following `cursor`.
    pub fn after(cursor: impl Into<String>, limit: usize) -> Self {
        Self {
            after: Some(cursor.into()),
            limit,
        }
    }
}

/// A page of requester records, ordered by email.
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub records: Vec<RequesterRecord>,
    /// Cursor for the next page; `None` once the scan is exhausted.
    pub next_cursor: Option<String>,
}

/// Trait for requester record storage backends.
///
/// Ticket lists are only ever rewritten through [`RequesterStore::replace_tickets`],
/// which refuses the write if the record's version moved since it was read.
pub trait RequesterStore: Send + Sync {
    /// Get the record for an email.
    fn get(&self, email: &str) -> Result<Option<RequesterRecord>, StoreError>;

    /// Create an empty record unless one exists. Returns true if created.
    fn create_if_absent(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<bool, StoreError>;

    /// Replace the full ticket list if the record is still at `expected_version`.
    /// Returns the new version.
    fn replace_tickets(
        &self,
        email: &str,
        tickets: &[StoredTicket],
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    /// Read one page of records.
    fn scan(&self, request: &ScanRequest) -> Result<RecordPage, StoreError>;

    /// Count all records.
    fn count(&self) -> Result<i64, StoreError>;
}

/// Returns true if `name` is safe to use as a table identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
