//! Vector store factory for runtime backend selection

use std::sync::Arc;

use crate::domain::vector_store::{VectorStore, VectorStoreConfig};
use crate::domain::DomainError;

use super::in_memory::InMemoryVectorStore;
use super::postgres::PostgresVectorStore;
use super::sqlite::SqliteVectorStore;

/// Factory for creating vector store instances
#[derive(Debug)]
pub struct VectorStoreFactory;

impl VectorStoreFactory {
    /// Creates a vector store based on the configuration
    ///
    /// `max_entries` only applies to backends holding entries in memory.
    pub async fn create(
        config: &VectorStoreConfig,
        max_entries: usize,
    ) -> Result<Arc<dyn VectorStore>, DomainError> {
        match config {
            VectorStoreConfig::Memory => Ok(Arc::new(InMemoryVectorStore::new(max_entries))),
            VectorStoreConfig::Sqlite(sqlite) => {
                let store = SqliteVectorStore::open(sqlite, max_entries).await?;
                Ok(Arc::new(store))
            }
            VectorStoreConfig::Postgres(postgres) => {
                let store = PostgresVectorStore::connect(postgres).await?;
                Ok(Arc::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vector_store::{PostgresStoreConfig, SqliteStoreConfig};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_memory_store() {
        let store = VectorStoreFactory::create(&VectorStoreConfig::Memory, 2)
            .await
            .unwrap();

        store
            .add("t", vec![1.0, 0.0], json!("a"), Duration::from_secs(60))
            .await
            .unwrap();
        let hit = store.search("t", &[1.0, 0.0]).await.unwrap().unwrap();

        assert_eq!(hit.result, json!("a"));
    }

    #[tokio::test]
    async fn test_create_sqlite_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = VectorStoreConfig::Sqlite(
            SqliteStoreConfig::new(dir.path().join("nested/cache.db"))
                .with_prune_interval(Duration::ZERO),
        );

        let store = VectorStoreFactory::create(&config, 10).await.unwrap();
        store
            .add("t", vec![0.0, 1.0], json!("b"), Duration::from_secs(60))
            .await
            .unwrap();
        store.close().await.unwrap();

        assert!(dir.path().join("nested/cache.db").exists());
    }

    #[tokio::test]
    async fn test_create_postgres_requires_dsn() {
        let config = VectorStoreConfig::Postgres(PostgresStoreConfig::new(""));

        let err = VectorStoreFactory::create(&config, 10).await.unwrap_err();

        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
