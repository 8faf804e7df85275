//! SQLite-backed state store.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{CardQueue, PendingCard, PropertyStore, StateError};
use crate::ticket::{TicketId, TicketedRow};

/// Raw `card_queue` columns: ticket_id, row_number, enqueued_at, attempts, last_error.
type QueueRow = (String, i64, String, u32, Option<String>);

/// SQLite-backed property store and card queue sharing one database.
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
}

impl SqliteStateStore {
    /// Create a new SQLite state store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StateError> {
        let conn = Connection::open(path).map_err(|e| StateError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite state store (useful for testing).
    pub fn in_memory() -> Result<Self, StateError> {
        let conn = Connection::open_in_memory().map_err(|e| StateError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StateError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS properties (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS card_queue (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                ticket_id TEXT NOT NULL UNIQUE,
                row_number INTEGER NOT NULL,
                enqueued_at TEXT NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0,
                last_error TEXT
            );
            "#,
        )
        .map_err(|e| StateError::Database(e.to_string()))
    }

    fn row_to_pending(row: &rusqlite::Row) -> rusqlite::Result<QueueRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }
}

impl PropertyStore for SqliteStateStore {
    fn get_property(&self, key: &str) -> Result<Option<String>, StateError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT value FROM properties WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StateError::Database(e.to_string()))
    }

    fn set_property(&self, key: &str, value: &str) -> Result<(), StateError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO properties (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )
        .map_err(|e| StateError::Database(e.to_string()))?;
        Ok(())
    }
}

impl CardQueue for SqliteStateStore {
    fn enqueue(&self, row: &TicketedRow) -> Result<(), StateError> {
        let conn = self.conn.lock().unwrap();
        let row_number = i64::try_from(row.row_number)
            .map_err(|_| StateError::Corrupt(format!("row number {} too large", row.row_number)))?;
        conn.execute(
            "INSERT INTO card_queue (ticket_id, row_number, enqueued_at) VALUES (?, ?, ?)
             ON CONFLICT(ticket_id) DO NOTHING",
            params![row.ticket_id.to_string(), row_number, Utc::now().to_rfc3339()],
        )
        .map_err(|e| StateError::Database(e.to_string()))?;
        Ok(())
    }

    fn pending(&self) -> Result<Vec<PendingCard>, StateError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT ticket_id, row_number, enqueued_at, attempts, last_error FROM card_queue ORDER BY seq ASC",
            )
            .map_err(|e| StateError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_pending)
            .map_err(|e| StateError::Database(e.to_string()))?;

        let mut pending = Vec::new();
        for row_result in rows {
            let (ticket_id, row_number, enqueued_at, attempts, last_error) =
                row_result.map_err(|e| StateError::Database(e.to_string()))?;

            let ticket_id = TicketId::parse(&ticket_id)
                .ok_or_else(|| StateError::Corrupt(format!("queued ticket id '{}'", ticket_id)))?;
            let row_number = usize::try_from(row_number)
                .map_err(|_| StateError::Corrupt(format!("queued row number {}", row_number)))?;
            let enqueued_at = DateTime::parse_from_rfc3339(&enqueued_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| StateError::Corrupt(e.to_string()))?;

            pending.push(PendingCard {
                ticket: TicketedRow {
                    row_number,
                    ticket_id,
                },
                enqueued_at,
                attempts,
                last_error,
            });
        }

        Ok(pending)
    }

    fn complete(&self, ticket_id: &str) -> Result<bool, StateError> {
        let conn = self.conn.lock().unwrap();
        let removed = conn
            .execute("DELETE FROM card_queue WHERE ticket_id = ?", params![ticket_id])
            .map_err(|e| StateError::Database(e.to_string()))?;
        Ok(removed > 0)
    }

    fn record_failure(&self, ticket_id: &str, error: &str) -> Result<(), StateError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE card_queue SET attempts = attempts + 1, last_error = ? WHERE ticket_id = ?",
            params![error, ticket_id],
        )
        .map_err(|e| StateError::Database(e.to_string()))?;
        Ok(())
    }
}
