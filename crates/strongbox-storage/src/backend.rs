// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`KeyValueBackend`].

use std::collections::HashMap;

use async_trait::async_trait;
use rusqlite::params;
use strongbox_config::model::StorageConfig;
use strongbox_core::{KeyValueBackend, PutOptions, StrongboxError};
use tracing::debug;

use crate::migrations::run_migrations;

/// Single-file key-value store.
///
/// Entries never leave the device, so end-to-end encryption is reported as
/// unavailable and the backup flag is recorded but not acted on.
pub struct SqliteBackend {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl SqliteBackend {
    /// Open (or create) the database at `config.database_path` and apply migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, StrongboxError> {
        let path = config.database_path.clone();
        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| StrongboxError::backend(format!("cannot open database {path}: {e}")))?;
        Self::initialize(conn, path, config.wal_mode).await
    }

    /// In-memory database, mostly for tests.
    pub async fn open_in_memory() -> Result<Self, StrongboxError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| StrongboxError::backend(format!("cannot open in-memory database: {e}")))?;
        Self::initialize(conn, ":memory:".to_string(), false).await
    }

    async fn initialize(
        conn: tokio_rusqlite::Connection,
        path: String,
        wal_mode: bool,
    ) -> Result<Self, StrongboxError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| run_migrations(conn))
            .await
            .map_err(|e| StrongboxError::backend(format!("database migration failed: {e}")))?;

        debug!(path = %path, wal_mode, "sqlite backend ready");
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of stored keys.
    pub async fn entry_count(&self) -> Result<usize, StrongboxError> {
        self.conn
            .call(|conn| -> Result<usize, rusqlite::Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM kv_entries", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Backup flag recorded with `key`, if present.
    pub async fn should_backup(&self, key: &str) -> Result<Option<bool>, StrongboxError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<bool>, rusqlite::Error> {
                let result = conn.query_row(
                    "SELECT should_backup FROM kv_entries WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, bool>(0),
                );
                match result {
                    Ok(flag) => Ok(Some(flag)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl KeyValueBackend for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn put(
        &self,
        key: &str,
        value: &[u8],
        options: PutOptions,
    ) -> Result<usize, StrongboxError> {
        let key = key.to_string();
        let value = value.to_vec();
        self.conn
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "INSERT INTO kv_entries (key, value, should_backup) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         should_backup = excluded.should_backup,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    params![key, value, options.should_backup],
                )?;
                Ok(value.len())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, StrongboxError> {
        let keys = keys.to_vec();
        self.conn
            .call(move |conn| -> Result<HashMap<String, Vec<u8>>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare_cached("SELECT value FROM kv_entries WHERE key = ?1")?;
                let mut found = HashMap::with_capacity(keys.len());
                for key in keys {
                    match stmt.query_row(params![key], |row| row.get::<_, Vec<u8>>(0)) {
                        Ok(value) => {
                            found.insert(key, value);
                        }
                        Err(rusqlite::Error::QueryReturnedNoRows) => {}
                        Err(e) => return Err(e),
                    }
                }
                Ok(found)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn get_all(&self) -> Result<HashMap<String, Vec<u8>>, StrongboxError> {
        self.conn
            .call(|conn| -> Result<HashMap<String, Vec<u8>>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT key, value FROM kv_entries")?;
                let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StrongboxError> {
        let keys = keys.to_vec();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare_cached("DELETE FROM kv_entries WHERE key = ?1")?;
                    for key in &keys {
                        stmt.execute(params![key])?;
                    }
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)
    }
}

fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StrongboxError {
    StrongboxError::backend(format!("sqlite error: {e}"))
}
