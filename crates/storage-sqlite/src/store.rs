//! Key-value blob store over a single sqlite table.

use log::warn;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use quotesync_core::errors::{Error, Result};
use quotesync_core::quotes::{Quote, QuoteStore, QUOTES_STORAGE_KEY};

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Durable key-value store backed by one sqlite table.
///
/// The collection blob lives under the fixed key `quotes`; preferences live
/// under their own keys in the same namespace. Every write is a single
/// upsert statement, so each save commits atomically and is durable once it
/// returns.
pub struct SqliteQuoteStore {
    conn: Mutex<Connection>,
}

impl SqliteQuoteStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|err| Error::storage(format!("Failed to open store: {}", err)))?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store, for tests and ephemeral callers.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|err| Error::storage(format!("Failed to open store: {}", err)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .map_err(|err| Error::storage(format!("Failed to initialize schema: {}", err)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn get(&self, key: &str) -> Option<String> {
        let conn = lock_unpoisoned(&self.conn);
        match conn.query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
            row.get::<_, String>(0)
        }) {
            Ok(value) => Some(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(err) => {
                warn!("[QuoteSync] Failed to read key '{}': {}", key, err);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = lock_unpoisoned(&self.conn);
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )
        .map_err(|err| Error::storage(format!("Failed to write key '{}': {}", key, err)))?;
        Ok(())
    }
}

impl QuoteStore for SqliteQuoteStore {
    fn load(&self) -> Vec<Quote> {
        let Some(blob) = self.get(QUOTES_STORAGE_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&blob) {
            Ok(quotes) => quotes,
            Err(err) => {
                // Undecodable stored data is treated as "no data".
                warn!("[QuoteSync] Stored collection failed to parse: {}", err);
                Vec::new()
            }
        }
    }

    fn save(&self, quotes: &[Quote]) -> Result<()> {
        let blob = serde_json::to_string(quotes)
            .map_err(|err| Error::storage(format!("Failed to encode collection: {}", err)))?;
        self.set(QUOTES_STORAGE_KEY, &blob)
    }

    fn load_preference(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn save_preference(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, value)
    }
}
