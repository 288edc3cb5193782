//! Durable key/value storage for the location state.
//!
//! Two records are kept: the full [`LocationState`] under [`STATE_KEY`] and a
//! reduced `{lat, lon, name}` record under [`LEGACY_KEY`] for older consumers.
//! Reads and writes are best-effort; failures are logged and swallowed by the
//! store, never surfaced to the user.

use parking_lot::Mutex;
use pendelwetter_core::StorageError;
use rusqlite::{params, Connection};
use std::path::Path;

use crate::types::{LegacyLocationRecord, LocationState};

/// Primary key holding the full location state JSON.
pub const STATE_KEY: &str = "pendelwetter.location";

/// Legacy key holding the reduced `{lat, lon, name}` JSON.
pub const LEGACY_KEY: &str = "weatherLocation";

/// SQLite-backed key/value store.
pub struct LocationStorage {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for LocationStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationStorage").finish_non_exhaustive()
    }
}

impl LocationStorage {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::OpenFailed(e.to_string()))?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::OpenFailed(e.to_string()))?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn
            .lock()
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS kv_store (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                "#,
            )
            .map_err(|e| StorageError::OpenFailed(e.to_string()))
    }

    /// Read a raw value.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT value FROM kv_store WHERE key = ?1")
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        let mut rows = stmt
            .query(params![key])
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        match rows.next() {
            Ok(Some(row)) => row
                .get::<_, String>(0)
                .map(Some)
                .map_err(|e| StorageError::ReadFailed(e.to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(e.to_string())),
        }
    }

    /// Write a raw value.
    pub fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .lock()
            .execute(
                "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|e| StorageError::WriteFailed(e.to_string()))
    }

    /// Load the persisted location state, if any.
    ///
    /// A malformed record is logged and treated as absent; rehydration must
    /// never take the process down.
    pub fn load_state(&self) -> Option<LocationState> {
        let raw = match self.get(STATE_KEY) {
            Ok(value) => value?,
            Err(e) => {
                tracing::warn!("Failed to read stored location: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<LocationState>(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!("Stored location is malformed, ignoring: {}", e);
                None
            }
        }
    }

    /// Persist the full state plus the legacy record in one transaction.
    ///
    /// Callers only invoke this once coordinates are present; a state without
    /// coordinates is skipped silently.
    pub fn persist_state(&self, state: &LocationState) -> Result<(), StorageError> {
        let Some(legacy) = LegacyLocationRecord::from_state(state) else {
            return Ok(());
        };

        let full = serde_json::to_string(state)
            .map_err(|e| StorageError::Malformed(e.to_string()))?;
        let reduced = serde_json::to_string(&legacy)
            .map_err(|e| StorageError::Malformed(e.to_string()))?;

        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        tx.execute(
            "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)",
            params![STATE_KEY, full],
        )
        .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        tx.execute(
            "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)",
            params![LEGACY_KEY, reduced],
        )
        .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        tx.commit()
            .map_err(|e| StorageError::WriteFailed(e.to_string()))
    }
}
