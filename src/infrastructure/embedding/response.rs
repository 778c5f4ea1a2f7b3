//! Locating embedding vectors inside provider responses

use serde_json::Value;

use crate::domain::DomainError;

/// Follow a dotted path such as `data.0.embedding`; numeric segments index arrays
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }

    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Extract a non-empty numeric vector at `path`
pub fn extract_vector(
    provider: &'static str,
    response: &Value,
    path: &str,
) -> Result<Vec<f32>, DomainError> {
    let node = lookup_path(response, path).ok_or_else(|| {
        DomainError::provider(provider, format!("No embedding at '{}' in response", path))
    })?;

    let vector: Vec<f32> = serde_json::from_value(node.clone()).map_err(|e| {
        DomainError::provider(provider, format!("Failed to parse embedding response: {}", e))
    })?;

    if vector.is_empty() {
        return Err(DomainError::provider(provider, "Provider returned an empty embedding"));
    }

    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_path() {
        let value = json!({"data": [{"embedding": [0.1, 0.2]}]});

        assert_eq!(
            lookup_path(&value, "data.0.embedding"),
            Some(&json!([0.1, 0.2]))
        );
        assert!(lookup_path(&value, "data.1.embedding").is_none());
        assert!(lookup_path(&value, "data.x").is_none());
    }

    #[test]
    fn test_lookup_empty_path_is_root() {
        let value = json!([1.0, 2.0]);
        assert_eq!(lookup_path(&value, ""), Some(&value));
    }

    #[test]
    fn test_extract_vector() {
        let value = json!({"embedding": [1, 0.5, -2]});

        assert_eq!(
            extract_vector("test", &value, "embedding").unwrap(),
            vec![1.0, 0.5, -2.0]
        );
    }

    #[test]
    fn test_extract_vector_errors() {
        let missing = extract_vector("test", &json!({}), "embedding").unwrap_err();
        assert!(missing.is_provider());

        let wrong_type = extract_vector("test", &json!({"embedding": "x"}), "embedding");
        assert!(wrong_type.is_err());

        let empty = extract_vector("test", &json!({"embedding": []}), "embedding").unwrap_err();
        assert!(empty.to_string().contains("empty embedding"));
    }
}
