//! OpenAI embedding provider implementation

use async_trait::async_trait;

use super::response::extract_vector;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI embedding provider
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    /// Create a new OpenAI embedding provider
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, DEFAULT_OPENAI_BASE_URL)
    }

    /// Create a new provider with custom base URL (Azure proxies, local gateways)
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": text,
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let url = self.embeddings_url();
        let body = self.build_request(text);

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await?;

        extract_vector(self.provider_name(), &response, "data.0.embedding")
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;

    const TEST_URL: &str = "https://api.openai.com/v1/embeddings";

    fn create_mock_response(dimensions: usize) -> serde_json::Value {
        let embedding: Vec<f32> = (0..dimensions).map(|j| j as f32 * 0.001).collect();

        json!({
            "object": "list",
            "model": "text-embedding-3-small",
            "data": [{"index": 0, "embedding": embedding, "object": "embedding"}],
            "usage": {"prompt_tokens": 3, "total_tokens": 3}
        })
    }

    #[tokio::test]
    async fn test_embed_single_text() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(1536));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key", "text-embedding-3-small");

        let vector = provider.embed("Hello world").await.unwrap();

        assert_eq!(vector.len(), 1536);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(4));
        let provider = OpenAiEmbeddingProvider::new(client, "sk-test", "text-embedding-3-large");

        provider.embed("What's the weather?").await.unwrap();

        let request = provider.client.last_request().unwrap();
        assert_eq!(
            request.body,
            json!({"model": "text-embedding-3-large", "input": "What's the weather?"})
        );
        assert!(request
            .headers
            .contains(&("Authorization".to_string(), "Bearer sk-test".to_string())));
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "Rate limit exceeded");
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key", "text-embedding-3-small");

        let result = provider.embed("Hello").await;

        assert!(result.unwrap_err().is_provider());
    }

    #[tokio::test]
    async fn test_empty_data_rejected() {
        let client = MockHttpClient::new().with_response(TEST_URL, json!({"data": []}));
        let provider = OpenAiEmbeddingProvider::new(client, "k", "m");

        let err = provider.embed("Hello").await.unwrap_err();

        assert!(err.to_string().contains("openai"));
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let custom_url = "http://localhost:8080/v1/embeddings";
        let client = MockHttpClient::new().with_response(custom_url, create_mock_response(8));
        let provider = OpenAiEmbeddingProvider::with_base_url(
            client,
            "test-key",
            "text-embedding-3-small",
            "http://localhost:8080/",
        );

        let vector = provider.embed("Test").await.unwrap();

        assert_eq!(vector.len(), 8);
    }

    #[test]
    fn test_provider_info() {
        let provider = OpenAiEmbeddingProvider::new(MockHttpClient::new(), "k", "text-embedding-3-small");

        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model(), "text-embedding-3-small");
    }
}
