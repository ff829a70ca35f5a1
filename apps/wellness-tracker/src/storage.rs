//! Persistence for the entry collection.
//!
//! The whole collection is stored as one JSON array in a single slot of a
//! key-value store. Unreadable data loads as an empty collection.

use crate::models::DailyEntry;
use chrono::Utc;
use rusqlite::{params, Connection};
#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Key of the slot holding the serialized entries.
pub const STORAGE_KEY: &str = "wellness-3x3-entries";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String slots addressed by key.
pub trait BlobStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Whole-collection load and save.
pub trait EntryPersistence {
    /// Stored entries, newest date first. Empty when nothing is stored or
    /// the stored data cannot be read.
    fn load(&self) -> Vec<DailyEntry>;

    /// Replace the stored collection.
    fn save(&self, entries: &[DailyEntry]) -> StorageResult<()>;
}

impl<B: BlobStore> EntryPersistence for B {
    fn load(&self) -> Vec<DailyEntry> {
        match self.get(STORAGE_KEY) {
            Ok(Some(raw)) => decode_entries(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored entries, starting fresh");
                Vec::new()
            }
        }
    }

    fn save(&self, entries: &[DailyEntry]) -> StorageResult<()> {
        let raw = serde_json::to_string(entries)?;
        self.set(STORAGE_KEY, &raw)
    }
}

/// Decode a stored entry array.
///
/// Input that is not a JSON array yields an empty collection; records that
/// fail to decode are skipped. Entries sharing a date are collapsed to the
/// one updated last, and the result is sorted by date, newest first.
pub fn decode_entries(raw: &str) -> Vec<DailyEntry> {
    let records: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "Stored entries are malformed, starting fresh");
            return Vec::new();
        }
    };

    let mut entries: Vec<DailyEntry> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed stored entry");
                None
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });

    let before = entries.len();
    entries.dedup_by_key(|e| e.date);
    if entries.len() < before {
        tracing::warn!(
            dropped = before - entries.len(),
            "Collapsed stored entries sharing a date"
        );
    }

    entries
}

/// SQLite-backed key-value store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create database at path, creating missing parent directories.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Create in-memory database (for testing).
    #[cfg(test)]
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> StorageResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl BlobStore for SqliteStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self.conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match value {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// In-process store with no durability.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose entry slot already holds `raw`.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .slots
            .borrow_mut()
            .insert(STORAGE_KEY.to_string(), raw.into());
        store
    }

    /// Current contents of the entry slot.
    pub fn raw(&self) -> Option<String> {
        self.slots.borrow().get(STORAGE_KEY).cloned()
    }
}

#[cfg(test)]
impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
