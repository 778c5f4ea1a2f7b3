//! Semantic caching service
//!
//! Composes an embedding provider with a vector store. Lookups embed the
//! input, search the partition and report a hit only when the best match
//! clears the similarity threshold.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::semantic_cache::{effective_threshold, CacheLookup};
use crate::domain::vector_store::{Payload, VectorStore};
use crate::domain::DomainError;
use crate::infrastructure::observability::{self, LookupOutcome};

/// Semantic cache over a single embedding provider and vector store
#[derive(Debug, Clone)]
pub struct SemanticCache {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    threshold: f32,
}

impl SemanticCache {
    /// Create a new cache; a threshold ≤ 0 falls back to the default
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        threshold: f32,
    ) -> Self {
        Self {
            provider,
            store,
            threshold: effective_threshold(threshold),
        }
    }

    /// Similarity a match must reach to count as a hit
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Get the underlying store
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Look up a semantically similar cached result
    ///
    /// Provider errors are returned before the store is touched. The computed
    /// embedding is part of every successful lookup.
    pub async fn get(&self, partition: &str, input: &str) -> Result<CacheLookup, DomainError> {
        let embedding = match self.provider.embed(input).await {
            Ok(embedding) => embedding,
            Err(e) => {
                observability::record_error(partition, "embed");
                return Err(e);
            }
        };

        let found = match self.store.search(partition, &embedding).await {
            Ok(found) => found,
            Err(e) => {
                observability::record_error(partition, "search");
                return Err(e);
            }
        };

        let lookup = match found {
            Some(hit) if hit.score >= self.threshold => {
                debug!(partition, score = hit.score, "Semantic cache hit");
                CacheLookup::hit(embedding, hit.result, hit.score)
            }
            Some(hit) => {
                debug!(
                    partition,
                    score = hit.score,
                    threshold = self.threshold,
                    "Semantic cache miss below threshold"
                );
                CacheLookup::miss(embedding, Some(hit.score))
            }
            None => {
                debug!(partition, "Semantic cache miss");
                CacheLookup::miss(embedding, None)
            }
        };

        let outcome = if lookup.is_hit() {
            LookupOutcome::Hit
        } else {
            LookupOutcome::Miss
        };
        observability::record_lookup(partition, outcome, lookup.best_score());

        Ok(lookup)
    }

    /// Store a result under an already computed embedding
    pub async fn set(
        &self,
        partition: &str,
        embedding: Vec<f32>,
        result: Payload,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.store
            .add(partition, embedding, result, ttl)
            .await
            .inspect_err(|_| observability::record_error(partition, "store"))
    }

    /// Serve from cache or run `compute` and cache its output
    ///
    /// Compute errors are returned and never cached. A failure to store the
    /// fresh value is logged; the value is still returned.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        partition: &str,
        input: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<DomainError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let lookup = self.get(partition, input).await?;

        match lookup.deserialize_result::<T>() {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => {
                warn!(partition, error = %e, "Ignoring undecodable cached value");
                observability::record_error(partition, "decode");
            }
        }

        let (embedding, _) = lookup.into_parts();
        let value = compute().await?;

        match serde_json::to_value(&value) {
            Ok(payload) => {
                if let Err(e) = self.set(partition, embedding, payload, ttl).await {
                    warn!(partition, error = %e, "Failed to cache computed value");
                }
            }
            Err(e) => {
                warn!(partition, error = %e, "Computed value is not serializable, not caching");
                observability::record_error(partition, "encode");
            }
        }

        Ok(value)
    }

    /// Remove expired entries from a partition, or all partitions when empty
    pub async fn prune(&self, partition: &str) {
        self.store.prune(partition).await;
    }

    /// Release the store's resources
    pub async fn close(&self) -> Result<(), DomainError> {
        self.store.close().await
    }
}
