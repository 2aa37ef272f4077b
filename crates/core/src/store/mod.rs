//! Requester record store: one record per submitter email holding the full
//! ticket list.

mod sqlite_store;
mod traits;
mod upsert;

pub use sqlite_store::SqliteRequesterStore;
pub use traits::{
    is_valid_identifier, RecordPage, RequesterRecord, RequesterStore, ScanRequest, StoreError,
};
pub use upsert::{upsert_ticket, UpsertOutcome, MAX_WRITE_ATTEMPTS};
