use rusqlite::{OptionalExtension, Result as SqlResult, params};
use std::path::Path;

use crate::common::Trip;

use super::database::Database;

const TRIPS_KEY: &str = "trips";
const DARK_MODE_KEY: &str = "dark_mode";

/// Key-value store for the trip list and the display-preference flag.
/// Values are JSON; the whole trip list is written in one statement,
/// so deleting a trip removes it and its destinations atomically.
pub struct TripStore {
    db: Database,
}

impl TripStore {
    /// Open (or create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let db = Database::new(path)?;
        let store = Self { db };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> SqlResult<Self> {
        let store = Self {
            db: Database::in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> SqlResult<()> {
        self.db.connection().execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> SqlResult<Option<String>> {
        self.db
            .connection()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
    }

    fn set(&self, key: &str, value: &str) -> SqlResult<()> {
        self.db.connection().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Load the persisted trip list. Missing or malformed data degrades
    /// to an empty list with a warning, never an error.
    pub fn load_trips(&self) -> Vec<Trip> {
        match self.get(TRIPS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Trip>>(&raw) {
                Ok(trips) => trips,
                Err(err) => {
                    log::warn!("Failed to parse stored trips: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!("Failed to read trips from store: {err}");
                Vec::new()
            }
        }
    }

    /// Replace the whole persisted trip list.
    pub fn save_trips(&self, trips: &[Trip]) -> SqlResult<()> {
        let json = serde_json::to_string(trips)
            .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
        self.set(TRIPS_KEY, &json)
    }

    pub fn dark_mode(&self) -> bool {
        match self.get(DARK_MODE_KEY) {
            Ok(Some(raw)) => raw == "true",
            Ok(None) => false,
            Err(err) => {
                log::warn!("Failed to read dark mode flag: {err}");
                false
            }
        }
    }

    pub fn set_dark_mode(&self, enabled: bool) -> SqlResult<()> {
        self.set(DARK_MODE_KEY, if enabled { "true" } else { "false" })
    }
}
