//! Vector store trait and search results

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use super::Payload;
use crate::domain::DomainError;

/// Best match returned by a vector store search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The cached result of the matching entry
    pub result: Payload,
    /// Cosine similarity between the query and the entry
    pub score: f32,
}

impl SearchHit {
    pub fn new(result: Payload, score: f32) -> Self {
        Self { result, score }
    }
}

/// Partitioned store of embedding/result pairs
///
/// Entries in one partition are never visible to queries in another.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Append a new entry expiring `ttl` from now
    async fn add(
        &self,
        key: &str,
        vector: Vec<f32>,
        result: Payload,
        ttl: Duration,
    ) -> Result<(), DomainError>;

    /// Find the live entry most similar to `query`
    ///
    /// `Ok(None)` when the partition has no live entries.
    async fn search(&self, key: &str, query: &[f32]) -> Result<Option<SearchHit>, DomainError>;

    /// Remove expired entries for a partition, or for every partition when
    /// `key` is empty. Best effort.
    async fn prune(&self, key: &str);

    /// Release held resources
    async fn close(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
