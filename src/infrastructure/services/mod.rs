//! Infrastructure services

mod semantic_cache_registry;
mod semantic_cache_service;

pub use semantic_cache_registry::{ProviderFactoryFn, SemanticCacheRegistry};
pub use semantic_cache_service::SemanticCache;
