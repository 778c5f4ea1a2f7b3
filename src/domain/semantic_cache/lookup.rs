//! Semantic cache lookup outcome

use serde::de::DeserializeOwned;

use crate::domain::vector_store::Payload;
use crate::domain::DomainError;

/// Outcome of a semantic cache lookup
///
/// The embedding is always present so a miss can be followed by a `set`
/// without embedding the input a second time.
#[derive(Debug, Clone)]
pub struct CacheLookup {
    embedding: Vec<f32>,
    result: Option<Payload>,
    best_score: Option<f32>,
}

impl CacheLookup {
    /// A hit: the best match cleared the threshold
    pub fn hit(embedding: Vec<f32>, result: Payload, score: f32) -> Self {
        Self {
            embedding,
            result: Some(result),
            best_score: Some(score),
        }
    }

    /// A miss, optionally with the score of the rejected best match
    pub fn miss(embedding: Vec<f32>, best_score: Option<f32>) -> Self {
        Self {
            embedding,
            result: None,
            best_score,
        }
    }

    /// Whether the lookup was a cache hit
    pub fn is_hit(&self) -> bool {
        self.result.is_some()
    }

    /// Embedding computed for the input
    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    /// Cached result on a hit
    pub fn result(&self) -> Option<&Payload> {
        self.result.as_ref()
    }

    /// Similarity of the best live entry, hit or not
    pub fn best_score(&self) -> Option<f32> {
        self.best_score
    }

    /// Consume into the embedding and the optional cached result
    pub fn into_parts(self) -> (Vec<f32>, Option<Payload>) {
        (self.embedding, self.result)
    }

    /// Deserialize the cached result into a concrete type
    pub fn deserialize_result<T: DeserializeOwned>(&self) -> Result<Option<T>, DomainError> {
        self.result
            .as_ref()
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    DomainError::serialization(format!(
                        "Failed to deserialize cached value: {}",
                        e
                    ))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_hit() {
        let lookup = CacheLookup::hit(vec![1.0], json!("cached"), 0.97);

        assert!(lookup.is_hit());
        assert_eq!(lookup.result(), Some(&json!("cached")));
        assert_eq!(lookup.best_score(), Some(0.97));
    }

    #[test]
    fn test_miss_keeps_embedding() {
        let lookup = CacheLookup::miss(vec![0.1, 0.2], Some(0.4));

        assert!(!lookup.is_hit());
        assert_eq!(lookup.embedding(), &[0.1, 0.2]);

        let (embedding, result) = lookup.into_parts();
        assert_eq!(embedding, vec![0.1, 0.2]);
        assert!(result.is_none());
    }

    #[test]
    fn test_deserialize_result() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct ToolOutput {
            text: String,
        }

        let lookup = CacheLookup::hit(vec![1.0], json!({"text": "hello"}), 1.0);
        let value: Option<ToolOutput> = lookup.deserialize_result().unwrap();
        assert_eq!(
            value,
            Some(ToolOutput {
                text: "hello".to_string()
            })
        );

        let miss = CacheLookup::miss(vec![1.0], None);
        let value: Option<ToolOutput> = miss.deserialize_result().unwrap();
        assert!(value.is_none());

        let wrong = CacheLookup::hit(vec![1.0], json!(42), 1.0);
        let result: Result<Option<ToolOutput>, _> = wrong.deserialize_result();
        assert!(result.is_err());
    }
}
