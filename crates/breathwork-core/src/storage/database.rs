//! SQLite-based session history and key-value storage.
//!
//! Provides persistent storage for:
//! - Finished breathing sessions (completed or skipped)
//! - Session statistics (daily and all-time)
//! - Key-value store for preferences and counters

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::StorageError;
use crate::mood::Mood;
use crate::session::ExitReason;

use super::{data_dir, KeyValueStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub technique_id: String,
    pub mood: String,
    pub cycles_completed: u32,
    pub outcome: String,
    pub duration_secs: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub skipped_sessions: u64,
    pub total_breathing_secs: u64,
    pub today_sessions: u64,
    pub today_breathing_secs: u64,
}

/// SQLite database for session history and key-value state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/breathwork/breathwork.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("breathwork.db"))
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                technique_id     TEXT NOT NULL,
                mood             TEXT NOT NULL,
                cycles_completed INTEGER NOT NULL,
                outcome          TEXT NOT NULL,
                duration_secs    INTEGER NOT NULL,
                started_at       TEXT NOT NULL,
                ended_at         TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_ended_at ON sessions(ended_at);",
        )?;
        Ok(())
    }

    /// Record a finished session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    #[allow(clippy::too_many_arguments)]
    pub fn record_session(
        &self,
        technique_id: &str,
        mood: Mood,
        cycles_completed: u32,
        outcome: ExitReason,
        duration_secs: u64,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO sessions (technique_id, mood, cycles_completed, outcome, duration_secs, started_at, ended_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                technique_id,
                mood.as_str(),
                cycles_completed,
                outcome.as_str(),
                i64::try_from(duration_secs).unwrap_or(i64::MAX),
                started_at.to_rfc3339(),
                ended_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent sessions first.
    pub fn recent_sessions(&self, limit: u32) -> Result<Vec<SessionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, technique_id, mood, cycles_completed, outcome, duration_secs, started_at, ended_at
             FROM sessions
             ORDER BY ended_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            let started: String = row.get(6)?;
            let ended: String = row.get(7)?;
            Ok(SessionRecord {
                id: row.get(0)?,
                technique_id: row.get(1)?,
                mood: row.get(2)?,
                cycles_completed: row.get(3)?,
                outcome: row.get(4)?,
                duration_secs: row.get::<_, i64>(5)?.max(0) as u64,
                started_at: parse_ts(&started),
                ended_at: parse_ts(&ended),
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    pub fn stats_today(&self) -> Result<Stats, StorageError> {
        self.stats_since(Some(today_start()))
    }

    pub fn stats_all(&self) -> Result<Stats, StorageError> {
        let mut stats = self.stats_since(None)?;
        let today = self.stats_since(Some(today_start()))?;
        stats.today_sessions = today.today_sessions;
        stats.today_breathing_secs = today.today_breathing_secs;
        Ok(stats)
    }

    fn stats_since(&self, since: Option<String>) -> Result<Stats, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT outcome, COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions
             WHERE ?1 IS NULL OR ended_at >= ?1
             GROUP BY outcome",
        )?;

        let mut stats = Stats::default();
        let rows = stmt.query_map(params![since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?.max(0) as u64,
                row.get::<_, i64>(2)?.max(0) as u64,
            ))
        })?;

        for row in rows {
            let (outcome, count, secs) = row?;
            stats.total_sessions += count;
            stats.total_breathing_secs += secs;
            match outcome.as_str() {
                "completed" => stats.completed_sessions += count,
                "skipped" => stats.skipped_sessions += count,
                _ => {}
            }
        }
        if since.is_some() {
            stats.today_sessions = stats.total_sessions;
            stats.today_breathing_secs = stats.total_breathing_secs;
        }
        Ok(stats)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv_get(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.kv_set(key, value)?)
    }
}

fn today_start() -> String {
    format!("{}T00:00:00+00:00", Utc::now().format("%Y-%m-%d"))
}

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_session("4-7-8", Mood::Anxious, 3, ExitReason::Completed, 57, now, now)
            .unwrap();
        db.record_session("box", Mood::Tired, 1, ExitReason::Skipped, 9, now, now)
            .unwrap();

        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.completed_sessions, 1);
        assert_eq!(stats.skipped_sessions, 1);
        assert_eq!(stats.total_breathing_secs, 66);
        assert_eq!(stats.today_sessions, 2);
    }

    #[test]
    fn today_excludes_older_sessions() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        let last_week = now - Duration::days(7);
        db.record_session("box", Mood::Sad, 3, ExitReason::Completed, 48, last_week, last_week)
            .unwrap();
        db.record_session("box", Mood::Sad, 3, ExitReason::Completed, 48, now, now)
            .unwrap();

        let today = db.stats_today().unwrap();
        assert_eq!(today.total_sessions, 1);
        assert_eq!(today.today_breathing_secs, 48);

        let all = db.stats_all().unwrap();
        assert_eq!(all.total_sessions, 2);
        assert_eq!(all.today_sessions, 1);
    }

    #[test]
    fn recent_sessions_newest_first() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_session("box", Mood::Sad, 3, ExitReason::Completed, 48, now - Duration::hours(1), now - Duration::hours(1))
            .unwrap();
        db.record_session("coherent", Mood::Happy, 2, ExitReason::Skipped, 14, now, now)
            .unwrap();

        let recent = db.recent_sessions(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].technique_id, "coherent");
        assert_eq!(recent[0].outcome, "skipped");
        assert_eq!(recent[1].mood, "sad");
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.set("test", "again").unwrap();
        assert_eq!(db.get("test").unwrap().as_deref(), Some("again"));
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breathwork.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.set("last_technique", "coherent").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.get("last_technique").unwrap().as_deref(), Some("coherent"));
    }
}
