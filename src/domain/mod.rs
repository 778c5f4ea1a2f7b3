//! Domain layer - Core cache types and traits

pub mod embedding;
pub mod error;
pub mod semantic_cache;
pub mod vector_store;

pub use embedding::{cosine_similarity, EmbeddingProvider, EmbeddingProviderConfig};
pub use error::DomainError;
pub use semantic_cache::{CacheLookup, SemanticCacheConfig};
pub use vector_store::{
    Payload, PostgresStoreConfig, SearchHit, SqliteStoreConfig, VectorEntry, VectorStore,
    VectorStoreConfig,
};
