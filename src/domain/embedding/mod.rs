//! Embedding provider domain models and traits

mod config;
mod provider;
mod similarity;

pub use config::EmbeddingProviderConfig;
pub use provider::EmbeddingProvider;
pub use similarity::{cosine_similarity, cosine_similarity_with_norms, vector_norm};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
