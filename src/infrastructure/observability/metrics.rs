//! Semantic cache metrics
//!
//! Emitted through the `metrics` facade; the embedding application decides
//! which recorder (Prometheus, statsd, ...) receives them.

use metrics::{counter, histogram};

/// Longest partition label kept as-is
const MAX_PARTITION_LABEL_LEN: usize = 64;

/// Result of a cache lookup, for labelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

/// Record a lookup and, when a match was scored, its similarity
pub fn record_lookup(partition: &str, outcome: LookupOutcome, best_score: Option<f32>) {
    let labels = [
        ("partition", sanitize_partition(partition)),
        ("outcome", outcome.as_str().to_string()),
    ];

    counter!("semantic_cache_lookups_total", &labels).increment(1);

    if let Some(score) = best_score {
        histogram!("semantic_cache_similarity", &labels).record(f64::from(score));
    }
}

/// Record a failure at a given stage (`embed`, `search`, `store`, ...)
pub fn record_error(partition: &str, stage: &'static str) {
    let labels = [
        ("partition", sanitize_partition(partition)),
        ("stage", stage.to_string()),
    ];

    counter!("semantic_cache_errors_total", &labels).increment(1);
}

/// Record entries evicted by capacity pressure
pub fn record_evictions(count: u64) {
    if count > 0 {
        counter!("semantic_cache_evictions_total").increment(count);
    }
}

/// Record expired rows deleted from durable storage
pub fn record_durable_prune(rows: u64) {
    if rows > 0 {
        counter!("semantic_cache_durable_pruned_total").increment(rows);
    }
}

/// Bound label cardinality and length
fn sanitize_partition(partition: &str) -> String {
    if partition.is_empty() {
        return "-".to_string();
    }

    partition.chars().take(MAX_PARTITION_LABEL_LEN).collect()
}
