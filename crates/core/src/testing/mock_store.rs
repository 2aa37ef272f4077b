//! Mock requester store for testing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use crate::store::{RecordPage, RequesterRecord, RequesterStore, ScanRequest, StoreError};
use crate::ticket::StoredTicket;

#[derive(Default)]
struct State {
    records: BTreeMap<String, RequesterRecord>,
    /// Writes applied by a simulated concurrent writer just before our next write.
    pending_concurrent: HashMap<String, Vec<StoredTicket>>,
    failing_write_emails: HashSet<String>,
    conflict_on_every_write: bool,
    fail_reads: bool,
    /// Scan pages served before scans start failing.
    scan_pages_before_failure: Option<usize>,
    scan_calls: usize,
    replace_calls: usize,
}

/// In-memory implementation of [`RequesterStore`] with failure injection.
///
/// Honors the same version semantics as the SQLite store so optimistic
/// concurrency paths can be exercised deterministically:
///
/// ```rust,ignore
/// let store = MockRequesterStore::new();
/// store.inject_concurrent_write("ada@example.com", other_ticket);
/// // the next replace_tickets for that email conflicts once
/// ```
#[derive(Default)]
pub struct MockRequesterStore {
    state: Mutex<State>,
}

impl std::fmt::Debug for MockRequesterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRequesterStore")
            .field("state", &"<state>")
            .finish()
    }
}

impl MockRequesterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing version checks.
    pub fn insert_record(&self, record: RequesterRecord) {
        let mut state = self.state.lock().unwrap();
        state.records.insert(record.email.clone(), record);
    }

    /// Simulate another writer appending `ticket` right before the next write
    /// to `email`, so that write hits a version conflict once.
    pub fn inject_concurrent_write(&self, email: &str, ticket: StoredTicket) {
        let mut state = self.state.lock().unwrap();
        state
            .pending_concurrent
            .entry(email.to_string())
            .or_default()
            .push(ticket);
    }

    /// Make every `replace_tickets` for `email` fail with a database error.
    pub fn fail_writes_for(&self, email: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_write_emails.insert(email.to_string());
    }

    /// Make every `replace_tickets` fail with a version conflict.
    pub fn fail_writes_with_conflict(&self, enabled: bool) {
        self.state.lock().unwrap().conflict_on_every_write = enabled;
    }

    /// Make `get` and `create_if_absent` fail with a database error.
    pub fn fail_reads(&self, enabled: bool) {
        self.state.lock().unwrap().fail_reads = enabled;
    }

    /// Serve `pages` scan pages, then fail every further scan.
    pub fn fail_scan_after_pages(&self, pages: usize) {
        self.state.lock().unwrap().scan_pages_before_failure = Some(pages);
    }

    /// Stop failing scans.
    pub fn clear_scan_failure(&self) {
        self.state.lock().unwrap().scan_pages_before_failure = None;
    }

    /// Number of `replace_tickets` calls made so far.
    pub fn replace_calls(&self) -> usize {
        self.state.lock().unwrap().replace_calls
    }

    /// Number of `scan` calls made so far.
    pub fn scan_calls(&self) -> usize {
        self.state.lock().unwrap().scan_calls
    }
}

impl RequesterStore for MockRequesterStore {
    fn get(&self, email: &str) -> Result<Option<RequesterRecord>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(StoreError::Database("mock read failure".to_string()));
        }
        Ok(state.records.get(email).cloned())
    }

    fn create_if_absent(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(StoreError::Database("mock read failure".to_string()));
        }
        if state.records.contains_key(email) {
            return Ok(false);
        }
        state.records.insert(
            email.to_string(),
            RequesterRecord {
                email: email.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                tickets: Vec::new(),
                version: 0,
            },
        );
        Ok(true)
    }

    fn replace_tickets(
        &self,
        email: &str,
        tickets: &[StoredTicket],
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.replace_calls += 1;

        if state.failing_write_emails.contains(email) {
            return Err(StoreError::Database("mock write failure".to_string()));
        }

        if state.conflict_on_every_write {
            return Err(StoreError::Conflict {
                email: email.to_string(),
                expected: expected_version,
            });
        }

        if let Some(concurrent) = state.pending_concurrent.remove(email) {
            if let Some(record) = state.records.get_mut(email) {
                record.tickets.extend(concurrent);
                record.version += 1;
            }
        }

        let record = state
            .records
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;

        if record.version != expected_version {
            return Err(StoreError::Conflict {
                email: email.to_string(),
                expected: expected_version,
            });
        }

        record.tickets = tickets.to_vec();
        record.version += 1;
        Ok(record.version)
    }

    fn scan(&self, request: &ScanRequest) -> Result<RecordPage, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.scan_calls += 1;

        if let Some(remaining) = state.scan_pages_before_failure {
            if remaining == 0 {
                return Err(StoreError::Database("mock scan failure".to_string()));
            }
            state.scan_pages_before_failure = Some(remaining - 1);
        }

        let records: Vec<RequesterRecord> = state
            .records
            .values()
            .filter(|r| match &request.after {
                Some(after) => r.email.as_str() > after.as_str(),
                None => true,
            })
            .take(request.limit)
            .cloned()
            .collect();

        let next_cursor = if request.limit > 0 && records.len() == request.limit {
            records.last().map(|r| r.email.clone())
        } else {
            None
        };

        Ok(RecordPage {
            records,
            next_cursor,
        })
    }

    fn count(&self) -> Result<i64, StoreError> {
        Ok(self.state.lock().unwrap().records.len() as i64)
    }
}
