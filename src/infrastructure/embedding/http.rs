//! Generic HTTP embedding provider
//!
//! Posts a JSON body to an arbitrary endpoint and reads the vector from a
//! dotted path in the response. The body is either `{"input": <text>}` or a
//! template in which every `{{input}}` is replaced by the JSON-escaped text,
//! e.g. `{"texts": ["{{input}}"], "truncate": true}`.

use std::collections::HashMap;

use async_trait::async_trait;

use super::response::extract_vector;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

const INPUT_PLACEHOLDER: &str = "{{input}}";

/// Embeddings from any JSON-over-HTTP endpoint
#[derive(Debug)]
pub struct HttpEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    url: String,
    headers: Vec<(String, String)>,
    body_template: Option<String>,
    response_json_path: String,
}

impl<C: HttpClientTrait> HttpEmbeddingProvider<C> {
    pub fn new(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            headers: Vec::new(),
            body_template: None,
            response_json_path: "embedding".to_string(),
        }
    }

    pub fn with_headers(mut self, headers: &HashMap<String, String>) -> Self {
        let mut headers: Vec<(String, String)> = headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        headers.sort();
        self.headers = headers;
        self
    }

    pub fn with_body_template(mut self, template: impl Into<String>) -> Self {
        self.body_template = Some(template.into());
        self
    }

    pub fn with_response_json_path(mut self, path: impl Into<String>) -> Self {
        self.response_json_path = path.into();
        self
    }

    fn build_body(&self, text: &str) -> Result<serde_json::Value, DomainError> {
        let Some(template) = &self.body_template else {
            return Ok(serde_json::json!({ "input": text }));
        };

        let rendered = template.replace(INPUT_PLACEHOLDER, &json_escape(text)?);

        serde_json::from_str(&rendered).map_err(|e| {
            DomainError::configuration(format!("Embedding body template is not valid JSON: {}", e))
        })
    }
}

/// JSON string escaping without the surrounding quotes
fn json_escape(text: &str) -> Result<String, DomainError> {
    let quoted = serde_json::to_string(text)
        .map_err(|e| DomainError::serialization(format!("Failed to escape input: {}", e)))?;

    Ok(quoted[1..quoted.len() - 1].to_string())
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for HttpEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let body = self.build_body(text)?;

        let mut headers: Vec<(&str, &str)> = vec![("Content-Type", "application/json")];
        headers.extend(self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let response = self.client.post_json(&self.url, headers, &body).await?;

        extract_vector(self.provider_name(), &response, &self.response_json_path)
    }

    fn provider_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;

    const TEST_URL: &str = "http://embedder.local/embed";

    #[tokio::test]
    async fn test_default_body_and_path() {
        let client = MockHttpClient::new().with_response(TEST_URL, json!({"embedding": [1.0, 2.0]}));
        let provider = HttpEmbeddingProvider::new(client, TEST_URL);

        let vector = provider.embed("hi").await.unwrap();

        assert_eq!(vector, vec![1.0, 2.0]);
        assert_eq!(provider.client.last_request().unwrap().body, json!({"input": "hi"}));
    }

    #[tokio::test]
    async fn test_template_escapes_input() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, json!({"result": {"vectors": [[0.1, 0.2, 0.3]]}}));
        let provider = HttpEmbeddingProvider::new(client, TEST_URL)
            .with_body_template(r#"{"texts": ["{{input}}"], "model": "bge"}"#)
            .with_response_json_path("result.vectors.0");

        let vector = provider.embed("say \"hi\"\nnow").await.unwrap();

        assert_eq!(vector.len(), 3);
        assert_eq!(
            provider.client.last_request().unwrap().body,
            json!({"texts": ["say \"hi\"\nnow"], "model": "bge"})
        );
    }

    #[tokio::test]
    async fn test_custom_headers_sent() {
        let mut headers = HashMap::new();
        headers.insert("X-Api-Key".to_string(), "secret".to_string());

        let client = MockHttpClient::new().with_response(TEST_URL, json!({"embedding": [1.0]}));
        let provider = HttpEmbeddingProvider::new(client, TEST_URL).with_headers(&headers);

        provider.embed("hi").await.unwrap();

        let request = provider.client.last_request().unwrap();
        assert!(request
            .headers
            .contains(&("X-Api-Key".to_string(), "secret".to_string())));
    }

    #[tokio::test]
    async fn test_invalid_template_is_configuration_error() {
        let provider = HttpEmbeddingProvider::new(MockHttpClient::new(), TEST_URL)
            .with_body_template("{\"input\": {{input}}");

        let err = provider.embed("hi").await.unwrap_err();

        assert!(matches!(err, DomainError::Configuration { .. }));
        assert!(provider.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_path_is_provider_error() {
        let client = MockHttpClient::new().with_response(TEST_URL, json!({"vector": [1.0]}));
        let provider = HttpEmbeddingProvider::new(client, TEST_URL);

        let err = provider.embed("hi").await.unwrap_err();

        assert!(err.is_provider());
    }

    #[test]
    fn test_json_escape() {
        assert_eq!(json_escape("a\"b\\c").unwrap(), "a\\\"b\\\\c");
        assert_eq!(json_escape("").unwrap(), "");
    }
}
