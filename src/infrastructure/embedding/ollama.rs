//! Ollama embedding provider implementation

use async_trait::async_trait;

use super::response::extract_vector;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Embeddings from a local Ollama server
#[derive(Debug)]
pub struct OllamaEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OllamaEmbeddingProvider<C> {
    pub fn new(client: C, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OllamaEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": text,
        });

        let response = self
            .client
            .post_json(
                &self.embeddings_url(),
                vec![("Content-Type", "application/json")],
                &body,
            )
            .await?;

        extract_vector(self.provider_name(), &response, "embedding")
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;

    const TEST_URL: &str = "http://localhost:11434/api/embeddings";

    #[tokio::test]
    async fn test_embed() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, json!({"embedding": [0.5, 0.25, 0.0]}));
        let provider = OllamaEmbeddingProvider::new(client, "http://localhost:11434/", "nomic-embed-text");

        let vector = provider.embed("hello").await.unwrap();

        assert_eq!(vector, vec![0.5, 0.25, 0.0]);
        let request = provider.client.last_request().unwrap();
        assert_eq!(request.url, TEST_URL);
        assert_eq!(
            request.body,
            json!({"model": "nomic-embed-text", "prompt": "hello"})
        );
    }

    #[tokio::test]
    async fn test_empty_embedding_is_error() {
        let client = MockHttpClient::new().with_response(TEST_URL, json!({"embedding": []}));
        let provider = OllamaEmbeddingProvider::new(client, "http://localhost:11434", "m");

        let err = provider.embed("hello").await.unwrap_err();

        assert!(err.is_provider());
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "connection refused");
        let provider = OllamaEmbeddingProvider::new(client, "http://localhost:11434", "m");

        assert!(provider.embed("hello").await.is_err());
        assert_eq!(provider.provider_name(), "ollama");
    }
}
