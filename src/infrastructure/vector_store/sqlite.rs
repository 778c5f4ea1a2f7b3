//! SQLite-backed vector store with an in-memory mirror
//!
//! Every add is applied to memory first and then appended to the
//! `semantic_cache_entries` table. Searches only ever read memory. On open,
//! rows that have not yet expired are replayed into memory in insertion
//! order, so capacity eviction during the replay matches what the previous
//! process saw.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use rand::Rng;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::Row;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::InMemoryVectorStore;
use crate::domain::vector_store::{
    ensure_finite, from_unix_millis, to_unix_millis, Payload, SearchHit, SqliteStoreConfig,
    VectorEntry, VectorStore,
};
use crate::domain::DomainError;
use crate::infrastructure::observability;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Vector store persisted to a SQLite file
#[derive(Debug)]
pub struct SqliteVectorStore {
    memory: InMemoryVectorStore,
    pool: SqlitePool,
    path: PathBuf,
    prune_probability: f64,
    prune_task: Mutex<Option<JoinHandle<()>>>,
    /// Held across the memory insert and the row insert so row ids follow
    /// memory FIFO order
    write_order: tokio::sync::Mutex<()>,
}

impl SqliteVectorStore {
    /// Open (or create) the database file and reload live entries
    pub async fn open(config: &SqliteStoreConfig, max_entries: usize) -> Result<Self, DomainError> {
        let pool = connect(config).await?;

        if let Err(e) = ensure_schema(&pool).await {
            pool.close().await;
            return Err(e);
        }

        let store = Self {
            memory: InMemoryVectorStore::new(max_entries),
            pool,
            path: config.path.clone(),
            prune_probability: config.effective_prune_probability(),
            prune_task: Mutex::new(None),
            write_order: tokio::sync::Mutex::new(()),
        };

        let loaded = store.load().await?;

        if let Some(interval) = config.prune_interval() {
            let handle = tokio::spawn(run_prune_loop(store.pool.clone(), interval));
            *store.prune_task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        }

        info!(
            path = %store.path.display(),
            loaded,
            max_entries = store.memory.max_entries(),
            "Opened persistent semantic cache store"
        );

        Ok(store)
    }

    /// The in-memory mirror
    pub fn memory(&self) -> &InMemoryVectorStore {
        &self.memory
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows in the durable table, expired ones included
    pub async fn durable_row_count(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM semantic_cache_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count cache rows: {}", e)))
    }

    /// Delete every expired row now, returning how many were removed
    pub async fn prune_durable(&self) -> Result<u64, DomainError> {
        delete_expired_rows(&self.pool, "").await
    }

    /// Replay live rows into memory in insertion order
    async fn load(&self) -> Result<usize, DomainError> {
        let rows = sqlx::query(
            "SELECT id, key, vector, result, expires_at FROM semantic_cache_entries \
             WHERE expires_at > ? ORDER BY id ASC",
        )
        .bind(to_unix_millis(SystemTime::now()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load cache rows: {}", e)))?;

        let mut loaded = 0;
        let mut skipped = 0;

        for row in rows {
            let (key, entry) = match decode_row(&row) {
                Ok(decoded) => decoded,
                Err(e) => {
                    let id: i64 = row.try_get("id").unwrap_or_default();
                    debug!(id, error = %e, "Skipping unreadable cache row");
                    skipped += 1;
                    continue;
                }
            };

            // The query filter and this check can disagree across a clock step.
            if entry.remaining_ttl(SystemTime::now()).is_none() {
                continue;
            }

            self.memory.insert(&key, entry)?;
            loaded += 1;
        }

        if skipped > 0 {
            warn!(skipped, path = %self.path.display(), "Skipped corrupted cache rows on load");
        }

        Ok(loaded)
    }

    async fn insert_row(&self, key: &str, row: EncodedRow) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO semantic_cache_entries (key, vector, result, norm, expires_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(key)
        .bind(row.vector)
        .bind(row.result)
        .bind(row.norm)
        .bind(row.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert cache row: {}", e)))?;

        Ok(())
    }

    fn maybe_spawn_prune(&self) {
        if !should_prune(self.prune_probability) {
            return;
        }

        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(e) = delete_expired_rows(&pool, "").await {
                warn!(error = %e, "Opportunistic cache prune failed");
            }
        });
    }

    fn stop_prune_task(&self) {
        if let Some(handle) = self
            .prune_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn add(
        &self,
        key: &str,
        vector: Vec<f32>,
        result: Payload,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        ensure_finite(&vector)?;

        let entry = VectorEntry::new(vector, result, ttl);
        let row = EncodedRow::encode(&entry)?;

        let write_order = self.write_order.lock().await;

        // Memory is not rolled back if the durable write fails: the entry
        // stays servable here but will not survive a restart.
        self.memory.insert(key, entry)?;

        if let Err(e) = self.insert_row(key, row).await {
            warn!(key, error = %e, "Cache entry kept in memory but not persisted");
            return Err(e);
        }

        drop(write_order);

        self.maybe_spawn_prune();

        Ok(())
    }

    async fn search(&self, key: &str, query: &[f32]) -> Result<Option<SearchHit>, DomainError> {
        self.memory.find_best(key, query)
    }

    async fn prune(&self, key: &str) {
        self.memory.remove_expired(key);

        if let Err(e) = delete_expired_rows(&self.pool, key).await {
            warn!(key, error = %e, "Failed to prune expired cache rows");
        }
    }

    async fn close(&self) -> Result<(), DomainError> {
        self.stop_prune_task();
        self.pool.close().await;

        info!(path = %self.path.display(), "Closed persistent semantic cache store");

        Ok(())
    }
}

impl Drop for SqliteVectorStore {
    fn drop(&mut self) {
        self.stop_prune_task();
    }
}

/// Column values of one durable row
struct EncodedRow {
    vector: String,
    result: String,
    norm: f64,
    expires_at: i64,
}

impl EncodedRow {
    fn encode(entry: &VectorEntry) -> Result<Self, DomainError> {
        let vector = serde_json::to_string(entry.vector()).map_err(|e| {
            DomainError::serialization(format!("Failed to serialize vector: {}", e))
        })?;
        let result = serde_json::to_string(entry.result()).map_err(|e| {
            DomainError::serialization(format!("Failed to serialize result: {}", e))
        })?;

        Ok(Self {
            vector,
            result,
            norm: f64::from(entry.norm()),
            expires_at: to_unix_millis(entry.expires_at()),
        })
    }
}

fn decode_row(row: &SqliteRow) -> Result<(String, VectorEntry), DomainError> {
    let column = |e: sqlx::Error| DomainError::serialization(format!("Bad column: {}", e));

    let key: String = row.try_get("key").map_err(column)?;
    let vector: String = row.try_get("vector").map_err(column)?;
    let result: String = row.try_get("result").map_err(column)?;
    let expires_at: i64 = row.try_get("expires_at").map_err(column)?;

    let vector: Vec<f32> = serde_json::from_str(&vector)
        .map_err(|e| DomainError::serialization(format!("Bad vector: {}", e)))?;
    let result: Payload = serde_json::from_str(&result)
        .map_err(|e| DomainError::serialization(format!("Bad result: {}", e)))?;

    Ok((
        key,
        VectorEntry::with_expiry(vector, result, from_unix_millis(expires_at)),
    ))
}

async fn connect(config: &SqliteStoreConfig) -> Result<SqlitePool, DomainError> {
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect_with(options)
        .await
        .map_err(|e| {
            DomainError::storage(format!(
                "Failed to open {}: {}",
                config.path.display(),
                e
            ))
        })
}

async fn ensure_schema(pool: &SqlitePool) -> Result<(), DomainError> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS semantic_cache_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key TEXT NOT NULL,
            vector TEXT NOT NULL,
            result TEXT NOT NULL,
            norm REAL NOT NULL,
            expires_at INTEGER NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_semantic_cache_key ON semantic_cache_entries(key)",
        "CREATE INDEX IF NOT EXISTS idx_semantic_cache_expires_at ON semantic_cache_entries(expires_at)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create schema: {}", e)))?;
    }

    Ok(())
}

/// Delete expired rows for `key`, or for every key when it is empty
async fn delete_expired_rows(pool: &SqlitePool, key: &str) -> Result<u64, DomainError> {
    let now = to_unix_millis(SystemTime::now());

    let query = if key.is_empty() {
        sqlx::query("DELETE FROM semantic_cache_entries WHERE expires_at <= ?").bind(now)
    } else {
        sqlx::query("DELETE FROM semantic_cache_entries WHERE expires_at <= ? AND key = ?")
            .bind(now)
            .bind(key)
    };

    let deleted = query
        .execute(pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to delete expired rows: {}", e)))?
        .rows_affected();

    if deleted > 0 {
        debug!(deleted, "Pruned expired cache rows");
        observability::record_durable_prune(deleted);
    }

    Ok(deleted)
}

async fn run_prune_loop(pool: SqlitePool, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        if pool.is_closed() {
            break;
        }

        if let Err(e) = delete_expired_rows(&pool, "").await {
            warn!(error = %e, "Scheduled cache prune failed");
        }
    }
}

fn should_prune(probability: f64) -> bool {
    probability > 0.0 && rand::thread_rng().gen_bool(probability)
}
