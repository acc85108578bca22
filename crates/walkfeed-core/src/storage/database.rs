//! SQLite-based persistence.
//!
//! Provides:
//! - Key-value store for application state (the serialized [`PetState`])
//! - Per-day step totals for the weekly chart and lifetime count

use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};
use std::path::Path;

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::steps::{week_start, WeekSteps};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite database for pet state and step history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/walkfeed.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("walkfeed.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and throwaway sessions).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS daily_steps (
                date  TEXT PRIMARY KEY,
                steps INTEGER NOT NULL
            );",
        )?;
        Ok(())
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

    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Record the cumulative step count seen on `date`.
    ///
    /// Keeps the highest value reported for the day, so late or out-of-order
    /// readings never lower the history.
    pub fn record_daily_steps(&self, date: NaiveDate, steps: u64) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO daily_steps (date, steps) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET steps = MAX(steps, excluded.steps)",
            params![date.format(DATE_FORMAT).to_string(), steps as i64],
        )?;
        Ok(())
    }

    pub fn steps_on(&self, date: NaiveDate) -> Result<u64, rusqlite::Error> {
        let result = self.conn.query_row(
            "SELECT steps FROM daily_steps WHERE date = ?1",
            params![date.format(DATE_FORMAT).to_string()],
            |row| row.get::<_, i64>(0),
        );
        match result {
            Ok(v) => Ok(v.max(0) as u64),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Monday-to-Sunday totals for the week containing `anchor`.
    pub fn week_steps(&self, anchor: NaiveDate) -> Result<WeekSteps, rusqlite::Error> {
        let start = week_start(anchor);
        let end = start + Duration::days(6);
        let mut stmt = self.conn.prepare(
            "SELECT date, steps FROM daily_steps
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date",
        )?;
        let rows = stmt.query_map(
            params![
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )?;

        let mut week = WeekSteps::empty(anchor);
        for row in rows {
            let (date, steps) = row?;
            if let Ok(date) = NaiveDate::parse_from_str(&date, DATE_FORMAT) {
                week.set(date, steps.max(0) as u64);
            }
        }
        Ok(week)
    }

    /// Sum of every recorded day.
    pub fn lifetime_steps(&self) -> Result<u64, rusqlite::Error> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(steps), 0) FROM daily_steps",
            [],
            |row| row.get(0),
        )?;
        Ok(total.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn daily_steps_keep_the_maximum() {
        let db = Database::open_memory().unwrap();
        let day = d(2026, 10, 14);
        db.record_daily_steps(day, 1200).unwrap();
        db.record_daily_steps(day, 800).unwrap();
        assert_eq!(db.steps_on(day).unwrap(), 1200);
        db.record_daily_steps(day, 3000).unwrap();
        assert_eq!(db.steps_on(day).unwrap(), 3000);
        assert_eq!(db.steps_on(d(2026, 10, 15)).unwrap(), 0);
    }

    #[test]
    fn week_and_lifetime() {
        let db = Database::open_memory().unwrap();
        db.record_daily_steps(d(2026, 10, 11), 500).unwrap(); // previous Sunday
        db.record_daily_steps(d(2026, 10, 12), 1000).unwrap();
        db.record_daily_steps(d(2026, 10, 15), 4000).unwrap();
        db.record_daily_steps(d(2026, 10, 18), 250).unwrap();

        let week = db.week_steps(d(2026, 10, 16)).unwrap();
        assert_eq!(week.week_start, d(2026, 10, 12));
        assert_eq!(week.days, [1000, 0, 0, 4000, 0, 0, 250]);
        assert_eq!(db.lifetime_steps().unwrap(), 5750);
    }
}
