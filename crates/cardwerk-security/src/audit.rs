// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Audit trail: append-only SQLite log of every print outcome.
//
// Schema:
//   audit_log(
//     id            INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp     TEXT    NOT NULL,   -- RFC 3339
//     message       TEXT    NOT NULL,
//     event_id      TEXT    NOT NULL,   -- e.g. "RPR_402", "RPR_405"
//     event_name    TEXT    NOT NULL,   -- e.g. "UPDATE", "EXCEPTION"
//     event_type    TEXT    NOT NULL,   -- e.g. "BUSINESS", "SYSTEM"
//     module_id     TEXT    NOT NULL,   -- success or failure code
//     module_name   TEXT    NOT NULL,
//     subject_id    TEXT                -- UIN, when known
//   )

use std::path::Path;
use std::sync::Mutex;

use cardwerk_core::error::CardwerkError;
use cardwerk_core::traits::AuditRecorder;
use cardwerk_core::types::AuditRecord;
use chrono::Utc;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS audit_log (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp     TEXT    NOT NULL,
    message       TEXT    NOT NULL,
    event_id      TEXT    NOT NULL,
    event_name    TEXT    NOT NULL,
    event_type    TEXT    NOT NULL,
    module_id     TEXT    NOT NULL,
    module_name   TEXT    NOT NULL,
    subject_id    TEXT
);";

const SELECT_COLUMNS: &str = "SELECT id, timestamp, message, event_id, event_name, event_type,
        module_id, module_name, subject_id FROM audit_log";

// ---------------------------------------------------------------------------
// Local error helpers
// ---------------------------------------------------------------------------

/// Convert a `rusqlite::Error` into a `CardwerkError::Database`.
fn db_err(e: rusqlite::Error) -> CardwerkError {
    CardwerkError::Database(e.to_string())
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A stored audit entry, returned by queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub message: String,
    pub event_id: String,
    pub event_name: String,
    pub event_type: String,
    pub module_id: String,
    pub module_name: String,
    pub subject_id: Option<String>,
}

/// Append-only audit log backed by a SQLite database.
///
/// The connection sits behind a mutex so one log can be shared by
/// concurrent print requests.
pub struct AuditLog {
    conn: Mutex<Connection>,
}

impl AuditLog {
    /// Open (or create) the audit database at `path`.
    ///
    /// WAL mode is enabled for better concurrent-read performance.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CardwerkError> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("audit log opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory audit database (useful for tests).
    pub fn open_in_memory() -> Result<Self, CardwerkError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("in-memory audit log opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CardwerkError> {
        self.conn
            .lock()
            .map_err(|_| CardwerkError::Database("audit connection lock poisoned".into()))
    }

    /// Append one entry.
    #[instrument(skip_all, fields(event_id = %record.event_id, module_id = %record.module_id))]
    pub fn append(&self, record: &AuditRecord) -> Result<(), CardwerkError> {
        let timestamp = Utc::now().to_rfc3339();
        self.lock()?
            .execute(
                "INSERT INTO audit_log (timestamp, message, event_id, event_name, event_type,
                 module_id, module_name, subject_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    timestamp,
                    record.message,
                    record.event_id,
                    record.event_name,
                    record.event_type,
                    record.module_id,
                    record.module_name,
                    record.subject_id,
                ],
            )
            .map_err(db_err)?;

        debug!("audit entry recorded");
        Ok(())
    }

    /// All entries for a subject, oldest first.
    pub fn entries_for_subject(&self, subject_id: &str) -> Result<Vec<AuditEntry>, CardwerkError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE subject_id = ?1 ORDER BY id ASC"
            ))
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![subject_id], row_to_entry)
            .map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent_entries(&self, limit: u32) -> Result<Vec<AuditEntry>, CardwerkError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?1"))
            .map_err(db_err)?;
        let rows = stmt.query_map(params![limit], row_to_entry).map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Total number of entries.
    pub fn count(&self) -> Result<u64, CardwerkError> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .map_err(db_err)
    }
}

impl AuditRecorder for AuditLog {
    fn record(&self, record: &AuditRecord) -> Result<(), CardwerkError> {
        self.append(record)
    }
}

/// Column order must match `SELECT_COLUMNS`.
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditEntry> {
    Ok(AuditEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        message: row.get(2)?,
        event_id: row.get(3)?,
        event_name: row.get(4)?,
        event_type: row.get(5)?,
        module_id: row.get(6)?,
        module_name: row.get(7)?,
        subject_id: row.get(8)?,
    })
}
