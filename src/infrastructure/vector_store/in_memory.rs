//! In-memory vector store implementation

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use crate::domain::embedding::vector_norm;
use crate::domain::semantic_cache::DEFAULT_MAX_ENTRIES;
use crate::domain::vector_store::{Payload, SearchHit, VectorEntry, VectorStore};
use crate::domain::DomainError;
use crate::infrastructure::observability;

/// In-memory vector store using linear search
///
/// Each partition is a FIFO queue capped at `max_entries`. Adding to a full
/// partition first drops expired entries, then evicts the oldest survivor.
/// A single lock guards every partition.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    items: RwLock<HashMap<String, VecDeque<VectorEntry>>>,
    max_entries: usize,
    evictions: AtomicU64,
}

impl InMemoryVectorStore {
    /// Create a new store; a capacity of 0 falls back to the default
    pub fn new(max_entries: usize) -> Self {
        let max_entries = if max_entries == 0 {
            DEFAULT_MAX_ENTRIES
        } else {
            max_entries
        };

        Self {
            items: RwLock::new(HashMap::new()),
            max_entries,
            evictions: AtomicU64::new(0),
        }
    }

    /// Per-partition capacity
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Append a prepared entry, enforcing expiry cleanup and capacity first
    pub fn insert(&self, key: &str, entry: VectorEntry) -> Result<(), DomainError> {
        let now = SystemTime::now();
        let mut items = self.items.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        let entries = items.entry(key.to_string()).or_default();
        entries.retain(|e| !e.is_expired_at(now));

        let mut evicted = 0;
        while entries.len() >= self.max_entries {
            entries.pop_front();
            evicted += 1;
        }

        entries.push_back(entry);

        if evicted > 0 {
            self.evictions.fetch_add(evicted, Ordering::Relaxed);
            observability::record_evictions(evicted);
        }

        Ok(())
    }

    /// Best live match in a partition; ties go to the oldest entry
    pub fn find_best(&self, key: &str, query: &[f32]) -> Result<Option<SearchHit>, DomainError> {
        let items = self.items.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        let Some(entries) = items.get(key) else {
            return Ok(None);
        };

        let now = SystemTime::now();
        let query_norm = vector_norm(query);
        let mut best: Option<(&VectorEntry, f32)> = None;

        for entry in entries.iter().filter(|e| !e.is_expired_at(now)) {
            let score = entry.similarity(query, query_norm);

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((entry, score));
            }
        }

        Ok(best.map(|(entry, score)| SearchHit::new(entry.result().clone(), score)))
    }

    /// Drop expired entries for `key`, or everywhere when `key` is empty
    ///
    /// Partitions left empty are removed. Returns the number of entries dropped.
    pub fn remove_expired(&self, key: &str) -> usize {
        let now = SystemTime::now();
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);

        let mut removed = 0;
        items.retain(|partition, entries| {
            if key.is_empty() || partition == key {
                let before = entries.len();
                entries.retain(|e| !e.is_expired_at(now));
                removed += before - entries.len();
            }
            !entries.is_empty()
        });

        removed
    }

    /// Number of stored entries in a partition, expired ones included
    pub fn len(&self, key: &str) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map_or(0, VecDeque::len)
    }

    /// Live entry count per partition, sorted by partition key
    pub fn partitions(&self) -> Vec<(String, usize)> {
        let now = SystemTime::now();
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);

        let mut partitions: Vec<(String, usize)> = items
            .iter()
            .map(|(key, entries)| {
                let live = entries.iter().filter(|e| !e.is_expired_at(now)).count();
                (key.clone(), live)
            })
            .filter(|(_, live)| *live > 0)
            .collect();

        partitions.sort_by(|a, b| a.0.cmp(&b.0));
        partitions
    }

    /// Entries of a partition in insertion order
    pub fn snapshot(&self, key: &str) -> Vec<VectorEntry> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Entries evicted by capacity pressure since creation
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(
        &self,
        key: &str,
        vector: Vec<f32>,
        result: Payload,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.insert(key, VectorEntry::new(vector, result, ttl))
    }

    async fn search(&self, key: &str, query: &[f32]) -> Result<Option<SearchHit>, DomainError> {
        self.find_best(key, query)
    }

    async fn prune(&self, key: &str) {
        self.remove_expired(key);
    }
}
