//! PostgreSQL vector store backed by the pgvector extension
//!
//! Unlike the SQLite store there is no in-memory mirror: every search is a
//! nearest-neighbour query ordered by cosine distance.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::{info, warn};

use crate::domain::vector_store::{
    ensure_finite, Payload, PostgresStoreConfig, SearchHit, VectorStore,
};
use crate::domain::DomainError;
use crate::infrastructure::observability;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest TTL written to the table; TIMESTAMPTZ is bounded
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Vector store persisted to PostgreSQL
pub struct PostgresVectorStore {
    pool: PgPool,
}

impl Debug for PostgresVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresVectorStore")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl PostgresVectorStore {
    /// Creates a store over an existing pool, preparing the schema
    pub async fn new(pool: PgPool) -> Result<Self, DomainError> {
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Connects to PostgreSQL and prepares the schema
    pub async fn connect(config: &PostgresStoreConfig) -> Result<Self, DomainError> {
        if config.dsn.trim().is_empty() {
            return Err(DomainError::configuration("postgres dsn is required"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&config.dsn)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        match Self::new(pool.clone()).await {
            Ok(store) => {
                info!("Connected semantic cache store to PostgreSQL");
                Ok(store)
            }
            Err(e) => {
                pool.close().await;
                Err(e)
            }
        }
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VectorStore for PostgresVectorStore {
    async fn add(
        &self,
        key: &str,
        vector: Vec<f32>,
        result: Payload,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        ensure_finite(&vector)?;
        if vector.is_empty() {
            return Err(DomainError::validation("Cannot store an empty vector"));
        }

        let expires_at = expiry_from_now(ttl);

        sqlx::query(
            "INSERT INTO semantic_cache_entries (key, vector, result, expires_at) \
             VALUES ($1, $2::vector, $3, $4)",
        )
        .bind(key)
        .bind(vector_literal(&vector))
        .bind(result)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to insert cache row: {}", e)))?;

        Ok(())
    }

    async fn search(&self, key: &str, query: &[f32]) -> Result<Option<SearchHit>, DomainError> {
        // pgvector rejects these outright; they cannot match anything.
        if !is_searchable(query) {
            return Ok(None);
        }

        // Rows of another dimension would make `<=>` raise.
        let row = sqlx::query(
            r#"
            SELECT result, (vector <=> $1::vector)::float8 AS distance
            FROM semantic_cache_entries
            WHERE key = $2 AND expires_at > $3 AND vector_dims(vector) = $4
            ORDER BY distance ASC
            LIMIT 1
            "#,
        )
        .bind(vector_literal(query))
        .bind(key)
        .bind(Utc::now())
        .bind(i32::try_from(query.len()).unwrap_or(i32::MAX))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to search cache rows: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let result: Payload = row
            .try_get("result")
            .map_err(|e| DomainError::serialization(format!("Bad cached result: {}", e)))?;
        let distance: Option<f64> = row
            .try_get("distance")
            .map_err(|e| DomainError::storage(format!("Bad distance column: {}", e)))?;

        Ok(Some(SearchHit::new(result, similarity_from_distance(distance))))
    }

    async fn prune(&self, key: &str) {
        let now = Utc::now();

        let query = if key.is_empty() {
            sqlx::query("DELETE FROM semantic_cache_entries WHERE expires_at <= $1").bind(now)
        } else {
            sqlx::query("DELETE FROM semantic_cache_entries WHERE expires_at <= $1 AND key = $2")
                .bind(now)
                .bind(key)
        };

        match query.execute(&self.pool).await {
            Ok(done) => observability::record_durable_prune(done.rows_affected()),
            Err(e) => warn!(key, error = %e, "Failed to prune expired cache rows"),
        }
    }

    async fn close(&self) -> Result<(), DomainError> {
        self.pool.close().await;
        Ok(())
    }
}

async fn ensure_schema(pool: &PgPool) -> Result<(), DomainError> {
    // Unconstrained vector column so different embedding models can share the table.
    let statements = [
        "CREATE EXTENSION IF NOT EXISTS vector",
        r#"
        CREATE TABLE IF NOT EXISTS semantic_cache_entries (
            id SERIAL PRIMARY KEY,
            key TEXT NOT NULL,
            vector vector,
            result JSONB,
            expires_at TIMESTAMPTZ
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_semantic_cache_key ON semantic_cache_entries(key)",
        "CREATE INDEX IF NOT EXISTS idx_semantic_cache_expires_at ON semantic_cache_entries(expires_at)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to prepare schema: {}", e)))?;
    }

    Ok(())
}

/// pgvector text form, e.g. `[1,0.5,0]`
fn vector_literal(vector: &[f32]) -> String {
    let parts: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(","))
}

fn is_searchable(query: &[f32]) -> bool {
    !query.is_empty() && query.iter().all(|v| v.is_finite())
}

/// pgvector returns NULL or NaN distances for zero vectors
fn similarity_from_distance(distance: Option<f64>) -> f32 {
    match distance {
        Some(d) if d.is_finite() => (1.0 - d) as f32,
        _ => 0.0,
    }
}

fn expiry_from_now(ttl: Duration) -> DateTime<Utc> {
    let now = Utc::now();

    chrono::Duration::from_std(ttl.min(MAX_TTL))
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(now)
}
