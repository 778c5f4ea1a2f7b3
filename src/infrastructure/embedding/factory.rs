//! Embedding provider factory

use std::sync::Arc;

use super::{HttpEmbeddingProvider, OllamaEmbeddingProvider, OpenAiEmbeddingProvider};
use crate::domain::embedding::{EmbeddingProvider, EmbeddingProviderConfig};
use crate::domain::DomainError;
use crate::infrastructure::http_client::{HttpClient, DEFAULT_HTTP_TIMEOUT};

/// Factory for creating embedding providers
#[derive(Debug)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    /// Create an embedding provider from configuration
    pub fn create(
        config: &EmbeddingProviderConfig,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let http_client = HttpClient::with_timeout(DEFAULT_HTTP_TIMEOUT)?;

        match config {
            EmbeddingProviderConfig::OpenAi {
                api_key,
                model,
                base_url,
            } => {
                if api_key.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "OpenAI embedding provider requires an api_key",
                    ));
                }

                let provider = match base_url.as_deref().filter(|url| !url.is_empty()) {
                    Some(url) => {
                        OpenAiEmbeddingProvider::with_base_url(http_client, api_key, model, url)
                    }
                    None => OpenAiEmbeddingProvider::new(http_client, api_key, model),
                };
                Ok(Arc::new(provider))
            }

            EmbeddingProviderConfig::Ollama { base_url, model } => {
                if base_url.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "Ollama embedding provider requires a base_url",
                    ));
                }

                let provider = OllamaEmbeddingProvider::new(http_client, base_url, model);
                Ok(Arc::new(provider))
            }

            EmbeddingProviderConfig::Http {
                url,
                headers,
                body_template,
                response_json_path,
            } => {
                if url.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "HTTP embedding provider requires a url",
                    ));
                }

                let mut provider = HttpEmbeddingProvider::new(http_client, url)
                    .with_headers(headers)
                    .with_response_json_path(response_json_path);
                if let Some(template) = body_template {
                    provider = provider.with_body_template(template);
                }
                Ok(Arc::new(provider))
            }
        }
    }
}
