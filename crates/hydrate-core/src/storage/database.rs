//! SQLite-based persistence.
//!
//! Provides persistent storage for:
//! - The key-value state store (remaining target, goal, interval, schedule)
//! - The drink log and intake statistics

use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DatabaseError;

use super::data_dir;

/// One logged drink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkRecord {
    pub id: i64,
    pub amount_ml: f64,
    pub at: DateTime<Utc>,
}

/// Intake statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_drinks: u64,
    pub total_ml: f64,
    pub today_drinks: u64,
    pub today_ml: f64,
}

/// Total intake for one local calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_ml: f64,
}

/// SQLite database holding the kv state store and the drink log.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/hydrate.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()?.join("hydrate.db");
        let conn = Connection::open(&path)
            .map_err(|source| DatabaseError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
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

            CREATE TABLE IF NOT EXISTS drinks (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                amount_ml REAL NOT NULL,
                at        TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_drinks_at ON drinks(at);",
        )?;
        Ok(())
    }

    // ── Key-value state store ────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a kv value parsed as a float. Unparseable values read as absent.
    pub fn kv_get_f64(&self, key: &str) -> Result<Option<f64>, DatabaseError> {
        Ok(self.kv_get(key)?.and_then(|v| v.parse().ok()))
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // ── Drink log ────────────────────────────────────────────────────

    /// Append a drink to the log.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn log_drink(&self, amount_ml: f64, at: DateTime<Utc>) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO drinks (amount_ml, at) VALUES (?1, ?2)",
            params![amount_ml, at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recently logged drink, if any.
    pub fn latest_drink(&self) -> Result<Option<DrinkRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, amount_ml, at FROM drinks ORDER BY id DESC LIMIT 1")?;
        match stmt.query_row([], row_to_drink) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Statistics for the current local calendar day.
    pub fn stats_today(&self) -> Result<Stats, DatabaseError> {
        let (count, ml) = self.count_and_sum_since(Some(local_day_start()))?;
        Ok(Stats {
            total_drinks: count,
            total_ml: ml,
            today_drinks: count,
            today_ml: ml,
        })
    }

    /// All-time statistics, with today's slice broken out.
    pub fn stats_all(&self) -> Result<Stats, DatabaseError> {
        let (total_drinks, total_ml) = self.count_and_sum_since(None)?;
        let (today_drinks, today_ml) = self.count_and_sum_since(Some(local_day_start()))?;
        Ok(Stats {
            total_drinks,
            total_ml,
            today_drinks,
            today_ml,
        })
    }

    /// Total intake grouped by local calendar day, oldest first.
    pub fn daily_totals(&self) -> Result<Vec<DailyTotal>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT amount_ml, at FROM drinks")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, f64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut grouped: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for row in rows {
            let (amount_ml, at) = row?;
            let Ok(at) = at.parse::<DateTime<Utc>>() else {
                continue;
            };
            let date = at.with_timezone(&Local).date_naive();
            *grouped.entry(date).or_insert(0.0) += amount_ml;
        }

        Ok(grouped
            .into_iter()
            .map(|(date, total_ml)| DailyTotal { date, total_ml })
            .collect())
    }

    fn count_and_sum_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<(u64, f64), DatabaseError> {
        let query = "SELECT COUNT(*), COALESCE(SUM(amount_ml), 0) FROM drinks WHERE at >= ?1";
        let row = match since {
            Some(since) => self.conn.query_row(
                query,
                params![since.to_rfc3339()],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, f64>(1)?)),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(amount_ml), 0) FROM drinks",
                [],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, f64>(1)?)),
            )?,
        };
        Ok(row)
    }
}

fn row_to_drink(row: &rusqlite::Row<'_>) -> rusqlite::Result<DrinkRecord> {
    let at: String = row.get(2)?;
    Ok(DrinkRecord {
        id: row.get(0)?,
        amount_ml: row.get(1)?,
        at: at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
    })
}

/// Start of the current local calendar day, in UTC.
fn local_day_start() -> DateTime<Utc> {
    let today = Local::now().date_naive();
    today
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
