//! Observability infrastructure - Metrics

mod metrics;

pub use metrics::{record_durable_prune, record_error, record_evictions, record_lookup, LookupOutcome};
