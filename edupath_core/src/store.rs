//! Persistent Store
//!
//! Durable key/value storage for the user profile, the saved collection,
//! the active workspace and preference fields. Values are opaque strings
//! (JSON for structured fields); the store itself has no logic.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

// ============================================================
// KEYS
// ============================================================

/// Logical keys persisted by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Query,
    Focus,
    Experience,
    Skills,
    Workspace,
    LoggedIn,
    UserEmail,
    SavedPaths,
    Theme,
}

impl StoreKey {
    pub const ALL: [StoreKey; 9] = [
        StoreKey::Query,
        StoreKey::Focus,
        StoreKey::Experience,
        StoreKey::Skills,
        StoreKey::Workspace,
        StoreKey::LoggedIn,
        StoreKey::UserEmail,
        StoreKey::SavedPaths,
        StoreKey::Theme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Query => "edupath.query",
            StoreKey::Focus => "edupath.focus",
            StoreKey::Experience => "edupath.experience",
            StoreKey::Skills => "edupath.skills",
            StoreKey::Workspace => "edupath.workspace",
            StoreKey::LoggedIn => "edupath.logged_in",
            StoreKey::UserEmail => "edupath.user_email",
            StoreKey::SavedPaths => "edupath.saved_paths",
            StoreKey::Theme => "edupath.theme",
        }
    }
}

// ============================================================
// STORE INTERFACE
// ============================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to create store directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value persistence used by [`crate::app::AppState`]
pub trait Store: Send + Sync {
    fn get(&self, key: StoreKey) -> StoreResult<Option<String>>;
    fn set(&self, key: StoreKey, value: &str) -> StoreResult<()>;
    fn remove(&self, key: StoreKey) -> StoreResult<()>;
}

// ============================================================
// SQLITE STORE
// ============================================================

/// SQLite-backed durable store
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store at `db_path`
    pub fn open(db_path: &Path) -> StoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        log::debug!("[STORE] Opened {}", db_path.display());
        Self::with_connection(conn)
    }

    /// Create an in-memory SQLite store for testing
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl Store for SqliteStore {
    fn get(&self, key: StoreKey) -> StoreResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: StoreKey, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key.as_str(), value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", [key.as_str()])?;
        Ok(())
    }
}

// ============================================================
// IN-MEMORY STORE
// ============================================================

/// Map-backed store with no durability
#[derive(Default)]
pub struct InMemoryStore {
    values: Mutex<HashMap<StoreKey, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, bypassing any application logic
    pub fn with(self, key: StoreKey, value: &str) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key, value.to_string());
        }
        self
    }
}

impl Store for InMemoryStore {
    fn get(&self, key: StoreKey) -> StoreResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(&key).cloned())
    }

    fn set(&self, key: StoreKey, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.remove(&key);
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn get(&self, key: StoreKey) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: StoreKey, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: StoreKey) -> StoreResult<()> {
        (**self).remove(key)
    }
}
