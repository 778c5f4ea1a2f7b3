//! Semantic cache domain models
//!
//! Provides vector-based caching that matches semantically similar inputs
//! rather than requiring exact key matches.

mod config;
mod lookup;

pub use config::{
    effective_threshold, SemanticCacheConfig, DEFAULT_MAX_ENTRIES, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use lookup::CacheLookup;
