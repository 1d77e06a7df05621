use async_trait::async_trait;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::adapter::CacheAdapter;
use crate::entry::{CacheEntry, INVALIDATED_AT};
use crate::error::CacheError;
use crate::key::CacheKey;

/// Number of key slots in the composite primary key.
///
/// Keys shorter than this are padded with empty strings; longer keys are
/// rejected as malformed.
const KEY_WIDTH: usize = 5;

/// Configuration for SqliteAdapter.
#[derive(Debug, Clone)]
pub struct SqliteAdapterConfig {
    /// Path of the database file. Parent directories are created on first
    /// use.
    pub path: PathBuf,

    /// Name of the table entries are stored in. Must be a plain identifier
    /// (`[A-Za-z_][A-Za-z0-9_]*`).
    pub table: String,
}

/// Persistent local adapter backed by SQLite.
///
/// The database is opened lazily on first use; construction does no I/O.
/// Entries are indexed by a fixed-width composite primary key of
/// [`KEY_WIDTH`] text slots and stored as serialized JSON, so cached data
/// survives process restarts. Prefix operations compile to equality
/// conditions on the leading key columns.
///
/// All operations guarantee read-after-write within the same process; the
/// connection is serialized behind a mutex.
pub struct SqliteAdapter<V>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    config: SqliteAdapterConfig,
    conn: OnceCell<Mutex<Connection>>,
    _marker: PhantomData<V>,
}

impl<V> SqliteAdapter<V>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    /// Create a new SqliteAdapter with the given configuration.
    ///
    /// No connection is opened until the first cache operation.
    ///
    /// # Example
    /// ```ignore
    /// let adapter: SqliteAdapter<User> = SqliteAdapter::new(SqliteAdapterConfig {
    ///     path: "/var/lib/app/cache.db".into(),
    ///     table: "data_cache".to_string(),
    /// });
    /// ```
    pub fn new(config: SqliteAdapterConfig) -> Self {
        SqliteAdapter {
            config,
            conn: OnceCell::new(),
            _marker: PhantomData,
        }
    }

    /// Get the lazily-initialized connection, opening the database and
    /// creating the table on first call.
    async fn conn(&self) -> Result<&Mutex<Connection>, CacheError> {
        self.conn.get_or_try_init(|| async { self.open() }).await
    }

    fn open(&self) -> Result<Mutex<Connection>, CacheError> {
        validate_table_name(&self.config.table)?;

        if let Some(parent) = self.config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CacheError::storage(
                    "sqlite",
                    "",
                    format!("failed to create cache directory: {}", e),
                )
            })?;
        }

        let conn = Connection::open(&self.config.path).map_err(|e| {
            CacheError::storage(
                "sqlite",
                "",
                format!(
                    "failed to open cache database at {}: {}",
                    self.config.path.display(),
                    e
                ),
            )
        })?;

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                key1 TEXT NOT NULL,
                key2 TEXT NOT NULL,
                key3 TEXT NOT NULL,
                key4 TEXT NOT NULL,
                key5 TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (key1, key2, key3, key4, key5)
            )",
            self.config.table
        ))
        .map_err(|e| {
            CacheError::storage("sqlite", "", format!("failed to create cache table: {}", e))
        })?;

        debug!(
            "opened sqlite cache: path={}, table={}",
            self.config.path.display(),
            self.config.table
        );

        Ok(Mutex::new(conn))
    }

    fn lock<'a>(
        &self,
        conn: &'a Mutex<Connection>,
        key: &CacheKey,
    ) -> Result<std::sync::MutexGuard<'a, Connection>, CacheError> {
        conn.lock()
            .map_err(|_| CacheError::storage("sqlite", key.encode(), "connection lock poisoned"))
    }

    /// Pad a key to [`KEY_WIDTH`] slots with empty strings.
    fn padded(key: &CacheKey) -> Result<Vec<String>, CacheError> {
        check_width(key)?;
        let mut slots = key.segments().to_vec();
        slots.resize(KEY_WIDTH, String::new());
        Ok(slots)
    }

    /// Equality conditions on the leading key columns for a prefix.
    fn prefix_clause(prefix: &CacheKey) -> String {
        (0..prefix.len())
            .map(|i| format!("key{} = ?{}", i + 1, i + 1))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

fn check_width(key: &CacheKey) -> Result<(), CacheError> {
    key.validate()?;
    if key.len() > KEY_WIDTH {
        return Err(CacheError::InvalidKey(format!(
            "cache key has {} segments, this backend supports at most {}",
            key.len(),
            KEY_WIDTH
        )));
    }
    Ok(())
}

fn validate_table_name(table: &str) -> Result<(), CacheError> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CacheError::storage(
            "sqlite",
            "",
            format!("invalid table name '{}'", table),
        ))
    }
}

#[async_trait]
impl<V> CacheAdapter<V> for SqliteAdapter<V>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry<V>>, CacheError> {
        let slots = Self::padded(key)?;
        let conn = self.conn().await?;
        let conn = self.lock(conn, key)?;

        let sql = format!(
            "SELECT data, updated_at FROM {}
             WHERE key1 = ?1 AND key2 = ?2 AND key3 = ?3 AND key4 = ?4 AND key5 = ?5",
            self.config.table
        );
        let row: Option<(String, i64)> = conn
            .query_row(&sql, params_from_iter(slots.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(|e| CacheError::storage("sqlite", key.encode(), format!("SELECT failed: {}", e)))?;

        match row {
            Some((json, updated_at)) => {
                let data: V = serde_json::from_str(&json).map_err(|e| {
                    CacheError::Serialization(format!("deserialization failed: {}", e))
                })?;
                Ok(Some(CacheEntry::new(data, updated_at)))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CacheKey, entry: CacheEntry<V>) -> Result<(), CacheError> {
        let slots = Self::padded(key)?;
        let json = serde_json::to_string(&entry.data)
            .map_err(|e| CacheError::Serialization(format!("serialization failed: {}", e)))?;

        let conn = self.conn().await?;
        let conn = self.lock(conn, key)?;

        let sql = format!(
            "INSERT OR REPLACE INTO {} (key1, key2, key3, key4, key5, data, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            self.config.table
        );
        conn.execute(
            &sql,
            rusqlite::params![
                slots[0],
                slots[1],
                slots[2],
                slots[3],
                slots[4],
                json,
                entry.updated_at
            ],
        )
        .map_err(|e| CacheError::storage("sqlite", key.encode(), format!("INSERT failed: {}", e)))?;

        Ok(())
    }

    async fn invalidate(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        check_width(prefix)?;
        let conn = self.conn().await?;
        let conn = self.lock(conn, prefix)?;

        let sql = format!(
            "UPDATE {} SET updated_at = {} WHERE {}",
            self.config.table,
            INVALIDATED_AT,
            Self::prefix_clause(prefix)
        );
        conn.execute(&sql, params_from_iter(prefix.segments().iter()))
            .map_err(|e| {
                CacheError::storage("sqlite", prefix.encode(), format!("UPDATE failed: {}", e))
            })?;

        Ok(())
    }

    async fn clear(&self, prefix: &CacheKey) -> Result<(), CacheError> {
        check_width(prefix)?;
        let conn = self.conn().await?;
        let conn = self.lock(conn, prefix)?;

        let sql = format!(
            "DELETE FROM {} WHERE {}",
            self.config.table,
            Self::prefix_clause(prefix)
        );
        conn.execute(&sql, params_from_iter(prefix.segments().iter()))
            .map_err(|e| {
                CacheError::storage("sqlite", prefix.encode(), format!("DELETE failed: {}", e))
            })?;

        Ok(())
    }

    async fn reset(&self) -> Result<(), CacheError> {
        let conn = self.conn().await?;
        let conn = conn
            .lock()
            .map_err(|_| CacheError::storage("sqlite", "", "connection lock poisoned"))?;

        conn.execute(&format!("DELETE FROM {}", self.config.table), [])
            .map_err(|e| CacheError::storage("sqlite", "", format!("DELETE failed: {}", e)))?;

        Ok(())
    }
}
