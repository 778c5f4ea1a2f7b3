//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for embedding providers (OpenAI, Ollama, generic HTTP)
///
/// Implementations either return a complete vector or an error; partial
/// embeddings are never produced.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate the embedding for a single input text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider returning fixed vectors per input text
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        embeddings: HashMap<String, Vec<f32>>,
        dimensions: usize,
        error: Option<String>,
        calls: AtomicUsize,
    }

    impl MockEmbeddingProvider {
        pub fn new() -> Self {
            Self {
                embeddings: HashMap::new(),
                dimensions: 3,
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_embedding(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
            self.embeddings.insert(text.into(), vector);
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        /// Number of embed calls made so far
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Default for MockEmbeddingProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }

            Ok(self
                .embeddings
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0; self.dimensions]))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_known_text() {
            let provider = MockEmbeddingProvider::new().with_embedding("hello", vec![1.0, 0.0, 0.0]);

            let vector = provider.embed("hello").await.unwrap();

            assert_eq!(vector, vec![1.0, 0.0, 0.0]);
            assert_eq!(provider.calls(), 1);
        }

        #[tokio::test]
        async fn test_mock_provider_unknown_text_is_zero_vector() {
            let provider = MockEmbeddingProvider::new();

            let vector = provider.embed("anything").await.unwrap();

            assert_eq!(vector, vec![0.0, 0.0, 0.0]);
        }

        #[tokio::test]
        async fn test_mock_provider_error() {
            let provider = MockEmbeddingProvider::new().with_error("API error");

            let result = provider.embed("hello").await;

            assert!(result.unwrap_err().is_provider());
        }
    }
}
