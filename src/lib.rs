//! semcache
//!
//! A semantic result cache: results are stored under the embedding of the
//! input that produced them and served again for inputs whose embedding is
//! similar enough, within a partition such as a tool or endpoint name.
//! - In-memory store with per-partition FIFO capacity and TTL expiry
//! - SQLite-mirrored store that survives restarts
//! - PostgreSQL/pgvector store
//! - OpenAI, Ollama and generic HTTP embedding providers

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{CacheLookup, DomainError, SemanticCacheConfig, VectorStore};
pub use infrastructure::services::{SemanticCache, SemanticCacheRegistry};
