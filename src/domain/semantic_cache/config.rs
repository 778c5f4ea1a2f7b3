//! Semantic cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::embedding::EmbeddingProviderConfig;
use crate::domain::vector_store::VectorStoreConfig;

/// Threshold used when the configured one is not positive
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.9;

/// Per-partition capacity used when the configured one is zero
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Configuration for semantic caching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Whether semantic caching is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Minimum cosine similarity for a cache hit
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Maximum number of live entries per partition
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Time-to-live for cached entries in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Vector store backend
    #[serde(default)]
    pub store: VectorStoreConfig,

    /// Embedding provider
    #[serde(default)]
    pub embedding: EmbeddingProviderConfig,
}

fn default_enabled() -> bool {
    true
}

fn default_similarity_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            similarity_threshold: default_similarity_threshold(),
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
            store: VectorStoreConfig::default(),
            embedding: EmbeddingProviderConfig::default(),
        }
    }
}

impl SemanticCacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get TTL as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Threshold actually applied to lookups
    pub fn effective_threshold(&self) -> f32 {
        effective_threshold(self.similarity_threshold)
    }

    /// Capacity actually applied per partition
    pub fn effective_max_entries(&self) -> usize {
        if self.max_entries == 0 {
            DEFAULT_MAX_ENTRIES
        } else {
            self.max_entries
        }
    }

    /// Set whether caching is enabled
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.min(1.0);
        self
    }

    /// Set the maximum number of entries per partition
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    /// Set the vector store backend
    pub fn with_store(mut self, store: VectorStoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Set the embedding provider
    pub fn with_embedding(mut self, embedding: EmbeddingProviderConfig) -> Self {
        self.embedding = embedding;
        self
    }
}

/// Non-positive (or NaN) thresholds fall back to the default
pub fn effective_threshold(threshold: f32) -> f32 {
    if threshold > 0.0 {
        threshold
    } else {
        DEFAULT_SIMILARITY_THRESHOLD
    }
}
