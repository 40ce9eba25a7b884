use crate::app_dirs::AppDirs;
use crate::attempt::AttemptRecord;
use chrono::{DateTime, Local};
use log::warn;
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

/// Aggregate performance for one difficulty tier.
#[derive(Debug, Clone, PartialEq)]
pub struct TierPerformance {
    pub tier: u8,
    pub attempts: i64,
    pub correct: i64,
    pub avg_time_secs: f64,
}

impl TierPerformance {
    /// Percentage of correct attempts (0-100).
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            (self.correct as f64 / self.attempts as f64) * 100.0
        }
    }
}

/// Read interface over historical attempt records.
///
/// The session engine depends on this trait rather than the concrete
/// store, so tests can supply canned histories.
pub trait HistoryReader {
    /// All attempts for a user within a practice set, oldest first.
    fn get_attempts(&self, username: &str, set_name: &str) -> Result<Vec<AttemptRecord>>;
}

/// Database manager for attempt history.
#[derive(Debug)]
pub struct ProgressDb {
    conn: Connection,
}

impl ProgressDb {
    /// Open the database at the default state directory, creating tables
    /// if needed.
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("mathdrill.db"));
        Self::open_at(db_path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("could not create state directory: {e}");
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory database, used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                set_name TEXT NOT NULL,
                question_id TEXT NOT NULL,
                tier INTEGER NOT NULL,
                correct BOOLEAN NOT NULL,
                time_taken_secs INTEGER NOT NULL,
                attempted_at TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_attempts_user_set
             ON attempts(username, set_name, attempted_at)",
            [],
        )?;

        Ok(ProgressDb { conn })
    }

    /// Record a single attempt.
    pub fn record_attempt(
        &self,
        username: &str,
        set_name: &str,
        attempt: &AttemptRecord,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO attempts
            (username, set_name, question_id, tier, correct, time_taken_secs, attempted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                username,
                set_name,
                attempt.question_id,
                attempt.tier,
                attempt.correct,
                attempt.time_taken_secs,
                attempt.attempted_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Record multiple attempts in a batch transaction.
    pub fn record_attempts_batch(
        &mut self,
        username: &str,
        set_name: &str,
        attempts: &[AttemptRecord],
    ) -> Result<()> {
        let tx = self.conn.transaction()?;

        for attempt in attempts {
            tx.execute(
                r#"
                INSERT INTO attempts
                (username, set_name, question_id, tier, correct, time_taken_secs, attempted_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    username,
                    set_name,
                    attempt.question_id,
                    attempt.tier,
                    attempt.correct,
                    attempt.time_taken_secs,
                    attempt.attempted_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Per-tier aggregate performance for a user within a practice set.
    pub fn tier_summary(&self, username: &str, set_name: &str) -> Result<Vec<TierPerformance>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                tier,
                COUNT(*) as attempts,
                SUM(CASE WHEN correct = 1 THEN 1 ELSE 0 END) as correct,
                AVG(time_taken_secs) as avg_time
            FROM attempts
            WHERE username = ?1 AND set_name = ?2
            GROUP BY tier
            ORDER BY tier
            "#,
        )?;

        let rows = stmt.query_map(params![username, set_name], |row| {
            Ok(TierPerformance {
                tier: row.get(0)?,
                attempts: row.get(1)?,
                correct: row.get(2)?,
                avg_time_secs: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
            })
        })?;

        let mut summary = Vec::new();
        for row in rows {
            summary.push(row?);
        }

        Ok(summary)
    }

    /// Timestamp of the most recent attempt, if any.
    pub fn last_attempt_at(
        &self,
        username: &str,
        set_name: &str,
    ) -> Result<Option<DateTime<Local>>> {
        let mut stmt = self.conn.prepare(
            "SELECT MAX(attempted_at) FROM attempts WHERE username = ?1 AND set_name = ?2",
        )?;
        let raw: Option<String> = stmt.query_row(params![username, set_name], |row| row.get(0))?;

        Ok(raw.and_then(|s| parse_timestamp(&s, 0).ok()))
    }

    /// Delete all attempts for a user within a practice set.
    pub fn clear(&self, username: &str, set_name: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM attempts WHERE username = ?1 AND set_name = ?2",
            params![username, set_name],
        )?;
        Ok(())
    }
}

impl HistoryReader for ProgressDb {
    fn get_attempts(&self, username: &str, set_name: &str) -> Result<Vec<AttemptRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT question_id, tier, correct, time_taken_secs, attempted_at
            FROM attempts
            WHERE username = ?1 AND set_name = ?2
            ORDER BY attempted_at ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![username, set_name], |row| {
            let raw: String = row.get(4)?;
            Ok(AttemptRecord {
                question_id: row.get(0)?,
                tier: row.get(1)?,
                correct: row.get(2)?,
                time_taken_secs: row.get(3)?,
                attempted_at: parse_timestamp(&raw, 4)?,
            })
        })?;

        let mut attempts = Vec::new();
        for row in rows {
            attempts.push(row?);
        }

        Ok(attempts)
    }
}

fn parse_timestamp(raw: &str, column: usize) -> Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                column,
                "attempted_at".to_string(),
                rusqlite::types::Type::Text,
            )
        })
}
