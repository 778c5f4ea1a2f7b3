//! Vector store domain models and traits
//!
//! A vector store keeps `(embedding, result, expiry)` tuples grouped by a
//! partition key and answers nearest-neighbour queries within a partition.

mod config;
mod entry;
mod store;

pub use config::{PostgresStoreConfig, SqliteStoreConfig, VectorStoreConfig};
pub use entry::{ensure_finite, from_unix_millis, to_unix_millis, Payload, VectorEntry};
pub use store::{SearchHit, VectorStore};
