use std::path::Path;

use serde::Deserialize;

use crate::domain::semantic_cache::SemanticCacheConfig;

/// Environment variable prefix, e.g. `SEMCACHE__SEMANTIC_CACHE__TTL_SECS=60`
pub const ENV_PREFIX: &str = "SEMCACHE";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub semantic_cache: SemanticCacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load `config/default`, `config/local` and `SEMCACHE__*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder(None)?.try_deserialize()
    }

    /// Like [`AppConfig::load`] with an extra file layered before the environment
    pub fn load_with_file(path: &Path) -> Result<Self, config::ConfigError> {
        Self::builder(Some(path))?.try_deserialize()
    }

    fn builder(extra: Option<&Path>) -> Result<config::Config, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = extra {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vector_store::VectorStoreConfig;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.semantic_cache.enabled);
        assert_eq!(config.semantic_cache.store, VectorStoreConfig::Memory);
    }

    #[test]
    fn test_load_with_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[logging]
format = "json"

[semantic_cache]
similarity_threshold = 0.95
ttl_secs = 60

[semantic_cache.store]
type = "sqlite"
path = "/var/lib/semcache/cache.db"
prune_probability = 0.5

[semantic_cache.embedding]
provider = "ollama"
model = "mxbai-embed-large"
"#
        )
        .unwrap();

        let config = AppConfig::load_with_file(file.path()).unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.semantic_cache.ttl(), Duration::from_secs(60));
        assert!((config.semantic_cache.similarity_threshold - 0.95).abs() < f32::EPSILON);

        let VectorStoreConfig::Sqlite(sqlite) = &config.semantic_cache.store else {
            panic!("expected sqlite store");
        };
        assert_eq!(sqlite.prune_interval_secs, 3600);
        assert_eq!(config.semantic_cache.embedding.kind(), "ollama");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(AppConfig::load_with_file(Path::new("/nonexistent/semcache.toml")).is_err());
    }
}
