//! Persistent record of posts that already received a poll

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::error::AppError;

/// A post that has been answered with a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRecord {
    pub post_id: String,
    pub title: String,
    pub poll_id: String,
}

/// Existence check and insert keyed by post id.
pub trait DedupStore {
    fn exists(&self, post_id: &str) -> Result<bool, AppError>;

    /// Records a post. Inserting a post id twice is an error.
    fn insert(&mut self, record: &PollRecord) -> Result<(), AppError>;
}

/// SQLite-backed store with one row per answered post.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file, creating its directory if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// In-memory store, gone when dropped.
    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS submission_polls (
                submission_id TEXT NOT NULL UNIQUE,
                submission_title TEXT NOT NULL,
                poll_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    /// Looks up the stored record for a post.
    pub fn get(&self, post_id: &str) -> Result<Option<PollRecord>, AppError> {
        let record = self
            .conn
            .query_row(
                "SELECT submission_id, submission_title, poll_id
                 FROM submission_polls WHERE submission_id = ?1",
                params![post_id],
                |row| {
                    Ok(PollRecord {
                        post_id: row.get(0)?,
                        title: row.get(1)?,
                        poll_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Number of answered posts.
    pub fn count(&self) -> Result<u64, AppError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM submission_polls", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl DedupStore for SqliteStore {
    fn exists(&self, post_id: &str) -> Result<bool, AppError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM submission_polls WHERE submission_id = ?1",
                params![post_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&mut self, record: &PollRecord) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO submission_polls (submission_id, submission_title, poll_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.post_id,
                record.title,
                record.poll_id,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }
}
