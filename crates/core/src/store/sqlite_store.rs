//! SQLite-backed requester store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    is_valid_identifier, RecordPage, RequesterRecord, RequesterStore, ScanRequest, StoreError,
};
use crate::ticket::StoredTicket;

/// SQLite-backed requester store.
///
/// Each requester is one row; the ticket list is stored as a JSON array next to
/// a `version` column used for conditional writes.
pub struct SqliteRequesterStore {
    conn: Mutex<Connection>,
    table: String,
}

impl SqliteRequesterStore {
    /// Open (or create) the database file and the requester table.
    pub fn new(path: &Path, table: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn, table)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory(table: &str) -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn, table)
    }

    fn with_connection(conn: Connection, table: &str) -> Result<Self, StoreError> {
        if !is_valid_identifier(table) {
            return Err(StoreError::InvalidIdentifier(table.to_string()));
        }
        Self::initialize_schema(&conn, table)?;
        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        })
    }

    fn initialize_schema(conn: &Connection, table: &str) -> Result<(), StoreError> {
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                email TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                tickets TEXT NOT NULL DEFAULT '[]',
                version INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#
        ))
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<RequesterRecord> {
        let email: String = row.get(0)?;
        let first_name: String = row.get(1)?;
        let last_name: String = row.get(2)?;
        let tickets_json: String = row.get(3)?;
        let version: i64 = row.get(4)?;

        let tickets: Vec<StoredTicket> = serde_json::from_str(&tickets_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(RequesterRecord {
            email,
            first_name,
            last_name,
            tickets,
            version: version as u64,
        })
    }

    fn fetch(conn: &Connection, table: &str, email: &str) -> Result<Option<RequesterRecord>, StoreError> {
        conn.query_row(
            &format!(
                "SELECT email, first_name, last_name, tickets, version FROM {} WHERE email = ?",
                table
            ),
            params![email],
            Self::row_to_record,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl RequesterStore for SqliteRequesterStore {
    fn get(&self, email: &str) -> Result<Option<RequesterRecord>, StoreError> {
        let conn = self.conn()?;
        Self::fetch(&conn, &self.table, email)
    }

    fn create_if_absent(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let inserted = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO {} (email, first_name, last_name, tickets, version, created_at, updated_at) VALUES (?, ?, ?, '[]', 0, ?, ?)",
                    self.table
                ),
                params![email, first_name, last_name, now, now],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(inserted == 1)
    }

    fn replace_tickets(
        &self,
        email: &str,
        tickets: &[StoredTicket],
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let tickets_json =
            serde_json::to_string(tickets).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let conn = self.conn()?;
        let updated = conn
            .execute(
                &format!(
                    "UPDATE {} SET tickets = ?, version = version + 1, updated_at = ? WHERE email = ? AND version = ?",
                    self.table
                ),
                params![
                    tickets_json,
                    Utc::now().to_rfc3339(),
                    email,
                    expected_version as i64
                ],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if updated == 1 {
            return Ok(expected_version + 1);
        }

        // Nothing matched: either the record is gone or someone else wrote first
        match Self::fetch(&conn, &self.table, email)? {
            None => Err(StoreError::NotFound(email.to_string())),
            Some(_) => Err(StoreError::Conflict {
                email: email.to_string(),
                expected: expected_version,
            }),
        }
    }

    fn scan(&self, request: &ScanRequest) -> Result<RecordPage, StoreError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT email, first_name, last_name, tickets, version FROM {} WHERE (?1 IS NULL OR email > ?1) ORDER BY email ASC LIMIT ?2",
                self.table
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![request.after, request.limit as i64],
                Self::row_to_record,
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut records = Vec::new();
        for row_result in rows {
            records.push(row_result.map_err(|e| StoreError::Database(e.to_string()))?);
        }

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
        let conn = self.conn()?;
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| {
            row.get(0)
        })
        .map_err(|e| StoreError::Database(e.to_string()))
    }
}
