// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use cohort_core::CohortError;
use tracing::debug;

use crate::migrations;

/// Convert tokio-rusqlite errors into `CohortError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CohortError {
    CohortError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the SQLite database behind a single writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    ///
    /// `wal_mode` selects the journal mode; disabling it keeps SQLite's
    /// default rollback journal for filesystems where WAL is unsupported.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, CohortError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| CohortError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| Ok(migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)?
            .map_err(|e| CohortError::Storage {
                source: Box::new(e),
            })?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database with migrations applied (tests, tooling).
    pub async fn open_in_memory() -> Result<Self, CohortError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| CohortError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| Ok(migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)?
            .map_err(|e| CohortError::Storage {
                source: Box::new(e),
            })?;

        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL. Called before shutdown.
    pub async fn close(&self) -> Result<(), CohortError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn journal_mode(db: &Database) -> String {
        db.connection()
            .call(|conn| {
                let mode = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
                Ok::<_, rusqlite::Error>(mode)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn open_creates_database_file_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        assert!(db_path.exists());

        // Schema exists after migrations.
        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'members'",
                    [],
                    |row| row.get(0),
                )?;
                Ok::<_, rusqlite::Error>(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_honors_wal_mode_setting() {
        let dir = tempdir().unwrap();

        let wal_path = dir.path().join("wal.db");
        let db = Database::open(wal_path.to_str().unwrap(), true).await.unwrap();
        assert_eq!(journal_mode(&db).await, "wal");
        db.close().await.unwrap();

        let plain_path = dir.path().join("plain.db");
        let db = Database::open(plain_path.to_str().unwrap(), false)
            .await
            .unwrap();
        assert_ne!(journal_mode(&db).await, "wal");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_twice_is_idempotent_for_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        {
            let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
            db.close().await.unwrap();
        }
        // Second open must not fail re-running migrations.
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn program_settings_row_is_seeded() {
        let db = Database::open_in_memory().await.unwrap();
        let week: i64 = db
            .connection()
            .call(|conn| {
                let w = conn.query_row(
                    "SELECT current_week FROM program_settings WHERE id = 1",
                    [],
                    |row| row.get(0),
                )?;
                Ok::<_, rusqlite::Error>(w)
            })
            .await
            .unwrap();
        assert_eq!(week, 1);
    }
}
