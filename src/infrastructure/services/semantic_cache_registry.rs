//! Lazy per-scope semantic cache registry
//!
//! Caches are created the first time a scope (typically a service id) asks
//! for one and are reused afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::SemanticCache;
use crate::domain::embedding::{EmbeddingProvider, EmbeddingProviderConfig};
use crate::domain::semantic_cache::SemanticCacheConfig;
use crate::domain::DomainError;
use crate::infrastructure::embedding::EmbeddingProviderFactory;
use crate::infrastructure::vector_store::VectorStoreFactory;

/// Builds an embedding provider from its configuration
pub type ProviderFactoryFn = Arc<
    dyn Fn(&EmbeddingProviderConfig) -> Result<Arc<dyn EmbeddingProvider>, DomainError>
        + Send
        + Sync,
>;

/// Registry creating one semantic cache per scope on demand
pub struct SemanticCacheRegistry {
    caches: Mutex<HashMap<String, Arc<SemanticCache>>>,
    provider_factory: ProviderFactoryFn,
}

impl std::fmt::Debug for SemanticCacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticCacheRegistry").finish_non_exhaustive()
    }
}

impl SemanticCacheRegistry {
    /// Create a registry using the default provider factory
    pub fn new() -> Self {
        Self::with_provider_factory(Arc::new(EmbeddingProviderFactory::create))
    }

    /// Create a registry with a custom provider factory
    pub fn with_provider_factory(provider_factory: ProviderFactoryFn) -> Self {
        Self {
            caches: Mutex::new(HashMap::new()),
            provider_factory,
        }
    }

    /// Get the cache for `scope`, creating it from `config` on first use
    ///
    /// Returns `None` when the configuration disables caching.
    pub async fn get_or_create(
        &self,
        scope: &str,
        config: &SemanticCacheConfig,
    ) -> Result<Option<Arc<SemanticCache>>, DomainError> {
        if !config.enabled {
            return Ok(None);
        }

        let mut caches = self.caches.lock().await;

        if let Some(cache) = caches.get(scope) {
            return Ok(Some(cache.clone()));
        }

        let provider = (self.provider_factory)(&config.embedding)?;
        let store =
            VectorStoreFactory::create(&config.store, config.effective_max_entries()).await?;
        let cache = Arc::new(SemanticCache::new(
            provider,
            store,
            config.effective_threshold(),
        ));

        info!(
            scope,
            provider = config.embedding.kind(),
            threshold = cache.threshold(),
            "Created semantic cache"
        );

        caches.insert(scope.to_string(), cache.clone());

        Ok(Some(cache))
    }

    /// Get an already created cache
    pub async fn get(&self, scope: &str) -> Option<Arc<SemanticCache>> {
        self.caches.lock().await.get(scope).cloned()
    }

    /// Number of scopes with a cache
    pub async fn len(&self) -> usize {
        self.caches.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Close and forget every cache, returning the first failure
    pub async fn close_all(&self) -> Result<(), DomainError> {
        let caches: Vec<(String, Arc<SemanticCache>)> =
            self.caches.lock().await.drain().collect();

        let mut first_error = None;

        for (scope, cache) in caches {
            if let Err(e) = cache.close().await {
                warn!(scope = %scope, error = %e, "Failed to close semantic cache");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

impl Default for SemanticCacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}
