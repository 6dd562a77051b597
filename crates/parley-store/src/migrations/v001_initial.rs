//! Initial schema: the single-row credential table.

use rusqlite::Connection;

pub fn up(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS credential (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            token TEXT NOT NULL,
            saved_at TEXT NOT NULL
        );",
    )
}
