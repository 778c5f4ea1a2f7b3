//! Embedding provider configuration

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which embedding endpoint to call and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmbeddingProviderConfig {
    /// OpenAI-compatible `/v1/embeddings`
    #[serde(rename = "openai")]
    OpenAi {
        #[serde(default)]
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        base_url: Option<String>,
    },

    /// Ollama `/api/embeddings`
    Ollama {
        #[serde(default = "default_ollama_base_url")]
        base_url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },

    /// Arbitrary HTTP endpoint returning a JSON vector
    Http {
        url: String,
        #[serde(default)]
        headers: HashMap<String, String>,
        /// Request body with an `{{input}}` placeholder
        #[serde(default)]
        body_template: Option<String>,
        /// Dotted path to the vector in the response, e.g. `data.0.embedding`
        #[serde(default = "default_response_json_path")]
        response_json_path: String,
    },
}

fn default_openai_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_response_json_path() -> String {
    "embedding".to_string()
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self::OpenAi {
            api_key: String::new(),
            model: default_openai_model(),
            base_url: None,
        }
    }
}

impl EmbeddingProviderConfig {
    /// OpenAI provider with the given key and model
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::OpenAi {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    /// Ollama provider at the given base URL
    pub fn ollama(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::Ollama {
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Generic HTTP provider with default body and response path
    pub fn http(url: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            headers: HashMap::new(),
            body_template: None,
            response_json_path: default_response_json_path(),
        }
    }

    /// Short name of the provider kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "openai",
            Self::Ollama { .. } => "ollama",
            Self::Http { .. } => "http",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_openai() {
        let config = EmbeddingProviderConfig::default();

        assert_eq!(config.kind(), "openai");
        assert_eq!(
            config,
            EmbeddingProviderConfig::openai("", "text-embedding-3-small")
        );
    }

    #[test]
    fn test_deserialize_ollama_with_defaults() {
        let config: EmbeddingProviderConfig =
            serde_json::from_str(r#"{"provider": "ollama"}"#).unwrap();

        assert_eq!(
            config,
            EmbeddingProviderConfig::ollama("http://localhost:11434", "nomic-embed-text")
        );
    }

    #[test]
    fn test_deserialize_http() {
        let config: EmbeddingProviderConfig = serde_json::from_str(
            r#"{"provider": "http", "url": "http://example.com", "headers": {"X-Key": "k"}}"#,
        )
        .unwrap();

        match config {
            EmbeddingProviderConfig::Http {
                url,
                headers,
                body_template,
                response_json_path,
            } => {
                assert_eq!(url, "http://example.com");
                assert_eq!(headers.get("X-Key").map(String::as_str), Some("k"));
                assert!(body_template.is_none());
                assert_eq!(response_json_path, "embedding");
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result: Result<EmbeddingProviderConfig, _> =
            serde_json::from_str(r#"{"provider": "unknown"}"#);

        assert!(result.is_err());
    }
}
