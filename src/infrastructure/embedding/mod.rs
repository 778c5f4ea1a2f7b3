//! Embedding provider implementations

mod factory;
mod http;
mod ollama;
mod openai;
mod response;

pub use factory::EmbeddingProviderFactory;
pub use http::HttpEmbeddingProvider;
pub use ollama::OllamaEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;
pub use response::lookup_path;
