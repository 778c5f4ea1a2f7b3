//! Stored vector entries

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::domain::embedding::{cosine_similarity_with_norms, vector_norm};
use crate::domain::DomainError;

/// Opaque cached result as seen by a store
pub type Payload = serde_json::Value;

/// Upper bound on a single entry's lifetime
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// A single cached embedding/result pair owned by one partition
#[derive(Debug, Clone)]
pub struct VectorEntry {
    vector: Vec<f32>,
    result: Payload,
    expires_at: SystemTime,
    norm: f32,
}

impl VectorEntry {
    /// Create an entry expiring `ttl` from now
    pub fn new(vector: Vec<f32>, result: Payload, ttl: Duration) -> Self {
        let now = SystemTime::now();
        let expires_at = now
            .checked_add(ttl.min(MAX_TTL))
            .unwrap_or(now + MAX_TTL);

        Self::with_expiry(vector, result, expires_at)
    }

    /// Create an entry with an absolute expiry
    pub fn with_expiry(vector: Vec<f32>, result: Payload, expires_at: SystemTime) -> Self {
        let norm = vector_norm(&vector);

        Self {
            vector,
            result,
            expires_at,
            norm,
        }
    }

    /// Get the embedding vector
    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    /// Get the cached result
    pub fn result(&self) -> &Payload {
        &self.result
    }

    /// Get the absolute expiry
    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Get the precomputed norm
    pub fn norm(&self) -> f32 {
        self.norm
    }

    /// Check if entry is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }

    /// Expired once `now` reaches the expiry; a zero TTL is never served
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, `None` when already expired
    pub fn remaining_ttl(&self, now: SystemTime) -> Option<Duration> {
        match self.expires_at.duration_since(now) {
            Ok(remaining) if !remaining.is_zero() => Some(remaining),
            _ => None,
        }
    }

    /// Cosine similarity against a query whose norm is already known
    pub fn similarity(&self, query: &[f32], query_norm: f32) -> f32 {
        cosine_similarity_with_norms(&self.vector, self.norm, query, query_norm)
    }

    /// Consume the entry, keeping only the cached result
    pub fn into_result(self) -> Payload {
        self.result
    }
}

/// Reject vectors that durable backends cannot store or reload
pub fn ensure_finite(vector: &[f32]) -> Result<(), DomainError> {
    match vector.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(DomainError::validation(format!(
            "Vector component {} is not finite",
            index
        ))),
        None => Ok(()),
    }
}

/// Milliseconds since the unix epoch, negative before it
pub fn to_unix_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX),
    }
}

/// Inverse of [`to_unix_millis`]
pub fn from_unix_millis(millis: i64) -> SystemTime {
    if millis >= 0 {
        UNIX_EPOCH + Duration::from_millis(millis as u64)
    } else {
        UNIX_EPOCH - Duration::from_millis(millis.unsigned_abs())
    }
}
