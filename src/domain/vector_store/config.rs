//! Vector store backend configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend selection for a semantic cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VectorStoreConfig {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    /// In-memory store mirrored to a SQLite file
    Sqlite(SqliteStoreConfig),
    /// PostgreSQL with the pgvector extension
    Postgres(PostgresStoreConfig),
}

impl VectorStoreConfig {
    /// SQLite-backed store at the given path with default pruning
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self::Sqlite(SqliteStoreConfig::new(path))
    }

    /// Postgres-backed store for the given DSN
    pub fn postgres(dsn: impl Into<String>) -> Self {
        Self::Postgres(PostgresStoreConfig::new(dsn))
    }
}

/// SQLite persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Database file, created if missing
    pub path: PathBuf,

    /// Interval of the background sweep of expired rows, 0 disables it
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,

    /// Chance that an add also triggers a sweep
    #[serde(default = "default_prune_probability")]
    pub prune_probability: f64,

    /// Maximum number of pooled connections
    #[serde(default = "default_sqlite_max_connections")]
    pub max_connections: u32,
}

fn default_prune_interval_secs() -> u64 {
    3600
}

fn default_prune_probability() -> f64 {
    0.01
}

fn default_sqlite_max_connections() -> u32 {
    4
}

impl SqliteStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            prune_interval_secs: default_prune_interval_secs(),
            prune_probability: default_prune_probability(),
            max_connections: default_sqlite_max_connections(),
        }
    }

    pub fn with_prune_interval(mut self, interval: Duration) -> Self {
        self.prune_interval_secs = interval.as_secs();
        self
    }

    pub fn with_prune_probability(mut self, probability: f64) -> Self {
        self.prune_probability = probability;
        self
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Background sweep interval, `None` when disabled
    pub fn prune_interval(&self) -> Option<Duration> {
        (self.prune_interval_secs > 0).then(|| Duration::from_secs(self.prune_interval_secs))
    }

    /// Probability clamped to `[0, 1]`; NaN counts as 0
    pub fn effective_prune_probability(&self) -> f64 {
        if self.prune_probability.is_nan() {
            return 0.0;
        }

        self.prune_probability.clamp(0.0, 1.0)
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostgresStoreConfig {
    pub dsn: String,

    #[serde(default = "default_postgres_max_connections")]
    pub max_connections: u32,
}

fn default_postgres_max_connections() -> u32 {
    10
}

impl PostgresStoreConfig {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            max_connections: default_postgres_max_connections(),
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}
