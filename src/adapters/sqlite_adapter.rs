//! SQLite layout storage adapter.
//!
//! Records are kept as JSON text in a small key/value table, one row per
//! storage key. A stored value that would not read back in full is copied to
//! a `<key>.bak.<timestamp>` row before it is replaced.

use crate::domain::config_validation::{DEFAULT_POOL_SIZE, MAX_POOL_SIZE};
use crate::domain::error::TradeboardError;
use crate::domain::record::LayoutRecord;
use crate::ports::config_port::ConfigPort;
use crate::ports::storage_port::LayoutStoragePort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::warn;

use super::json_file_adapter::DEFAULT_STORAGE_KEY;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
    key: String,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradeboardError> {
        let db_path =
            config
                .get_string("storage", "path")
                .ok_or_else(|| TradeboardError::ConfigMissing {
                    section: "storage".into(),
                    key: "path".into(),
                })?;
        let key = config
            .get_string("storage", "key")
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        let pool_size = config.get_int("storage", "pool_size", DEFAULT_POOL_SIZE as i64);
        let pool_size = u32::try_from(pool_size)
            .ok()
            .filter(|n| (1..=MAX_POOL_SIZE).contains(n))
            .ok_or_else(|| TradeboardError::ConfigInvalid {
                section: "storage".into(),
                key: "pool_size".into(),
                reason: format!("pool_size must be between 1 and {}", MAX_POOL_SIZE),
            })?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| TradeboardError::Storage {
                    reason: e.to_string(),
                })?;

        let adapter = Self { pool, key };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory(key: &str) -> Result<Self, TradeboardError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TradeboardError::Storage {
                reason: e.to_string(),
            })?;

        let adapter = Self {
            pool,
            key: key.to_string(),
        };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn initialize_schema(&self) -> Result<(), TradeboardError> {
        let conn = self.connection()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS layout_store (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .map_err(|e: rusqlite::Error| TradeboardError::StorageQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, TradeboardError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| TradeboardError::Storage {
                reason: e.to_string(),
            })
    }
}

fn stored_value(conn: &Connection, key: &str) -> Result<Option<String>, TradeboardError> {
    conn.query_row(
        "SELECT value FROM layout_store WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e: rusqlite::Error| TradeboardError::StorageQuery {
        reason: e.to_string(),
    })
}

fn put_value(conn: &Connection, key: &str, value: &str) -> Result<(), TradeboardError> {
    conn.execute(
        "INSERT OR REPLACE INTO layout_store (key, value, updated_at)
         VALUES (?1, ?2, ?3)",
        params![key, value, chrono::Utc::now().to_rfc3339()],
    )
    .map_err(|e: rusqlite::Error| TradeboardError::StorageQuery {
        reason: e.to_string(),
    })?;
    Ok(())
}

impl LayoutStoragePort for SqliteAdapter {
    fn load(&self) -> Result<Option<LayoutRecord>, TradeboardError> {
        let conn = self.connection()?;
        match stored_value(&conn, &self.key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn store(&self, record: &LayoutRecord) -> Result<(), TradeboardError> {
        let json = serde_json::to_string(record)?;
        let conn = self.connection()?;

        if let Some(previous) = stored_value(&conn, &self.key)? {
            let lossy = match serde_json::from_str(&previous) {
                Ok(value) => LayoutRecord::lossy_reason(&value),
                Err(e) => Some(e.to_string()),
            };
            if let Some(reason) = lossy {
                let backup_key = format!(
                    "{}.bak.{}",
                    self.key,
                    chrono::Utc::now().format("%Y%m%d-%H%M%S%.f")
                );
                put_value(&conn, &backup_key, &previous)?;
                warn!(key = %backup_key, reason = %reason, "kept a copy of unreadable layouts");
            }
        }

        put_value(&conn, &self.key, &json)
    }
}
