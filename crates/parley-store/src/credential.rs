//! Persistence of the session credential.
//!
//! The credential is an opaque bearer token handed out by the server
//! (directly or via an external identity provider redirect). It is
//! write-owned by the session layer: saved on bootstrap, cleared on
//! logout or server-side rejection. At most one credential exists at a
//! time, enforced by the single-row table schema.

use chrono::Utc;
use rusqlite::params;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Persist the credential, replacing any previous one.
    pub fn save_credential(&self, token: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO credential (id, token, saved_at) VALUES (1, ?1, ?2)",
            params![token, Utc::now().to_rfc3339()],
        )?;
        tracing::debug!("credential saved");
        Ok(())
    }

    /// Load the persisted credential, if any.
    pub fn load_credential(&self) -> Result<Option<String>> {
        let token = self
            .conn()
            .query_row("SELECT token FROM credential WHERE id = 1", [], |row| {
                row.get::<_, String>(0)
            });

        match token {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the persisted credential. Idempotent.
    pub fn clear_credential(&self) -> Result<()> {
        self.conn()
            .execute("DELETE FROM credential WHERE id = 1", [])?;
        tracing::debug!("credential cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn save_and_load() {
        let (_dir, db) = open_test_db();
        assert_eq!(db.load_credential().unwrap(), None);

        db.save_credential("tok-abc").unwrap();
        assert_eq!(db.load_credential().unwrap(), Some("tok-abc".to_string()));
    }

    #[test]
    fn save_replaces_previous() {
        let (_dir, db) = open_test_db();
        db.save_credential("first").unwrap();
        db.save_credential("second").unwrap();
        assert_eq!(db.load_credential().unwrap(), Some("second".to_string()));
    }

    #[test]
    fn clear_is_idempotent() {
        let (_dir, db) = open_test_db();
        db.save_credential("tok").unwrap();
        db.clear_credential().unwrap();
        db.clear_credential().unwrap();
        assert_eq!(db.load_credential().unwrap(), None);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let db = Database::open_at(&path).unwrap();
            db.save_credential("persisted").unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.load_credential().unwrap(), Some("persisted".to_string()));
    }
}
