// SQLite backend: a local-storage style key/value table

use crate::models::{Item, now_ms};
use crate::storage::{self, Storage};
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const DB_FILE: &str = "grocerytracker.db";

/// Keeps the collection blob in a `local_storage(key, value)` table,
/// mirroring how the browser version used `localStorage`.
pub struct SqliteStore {
    db: Connection,
    key: String,
}

impl SqliteStore {
    /// Open or create the database in `dir`, storing the blob under `key`
    pub fn open<P: AsRef<Path>>(dir: P, key: &str) -> Result<Self> {
        storage::validate_key(key)?;

        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create data directory")?;

        let db_path = dir.join(DB_FILE);
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let store = Self {
            db,
            key: key.to_string(),
        };
        store.create_schema()?;

        Ok(store)
    }

    /// Open an in-memory database
    pub fn in_memory(key: &str) -> Result<Self> {
        storage::validate_key(key)?;
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self {
            db,
            key: key.to_string(),
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    /// Raw blob stored under this store's key, if any
    pub fn raw_value(&self) -> Result<Option<String>> {
        let value = self
            .db
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [&self.key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl Storage for SqliteStore {
    fn load(&self) -> Result<Vec<Item>> {
        let items = match self.raw_value()? {
            Some(blob) => storage::decode(&blob)?,
            None => Vec::new(),
        };

        info!(key = %self.key, count = items.len(), "Loaded items from SQLite");
        Ok(items)
    }

    fn save(&mut self, items: &[Item]) -> Result<()> {
        let blob = storage::encode(items)?;

        let tx = self.db.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO local_storage (key, value, updated_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![&self.key, blob, now_ms()],
        )?;
        tx.commit()?;

        debug!(key = %self.key, count = items.len(), "Saved items to SQLite");
        Ok(())
    }
}
