//! Vector similarity math

/// Euclidean norm of a vector
pub fn vector_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Calculate cosine similarity between two vectors
///
/// Mismatched lengths, empty input or a zero-norm vector all yield 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_similarity_with_norms(a, vector_norm(a), b, vector_norm(b))
}

/// Cosine similarity using norms computed ahead of time
pub fn cosine_similarity_with_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![0.3, -1.2, 4.5, 0.01];

        let similarity = cosine_similarity(&a, &a);

        assert!((similarity - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];

        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];

        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_close_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.99, 0.05, 0.0];

        let similarity = cosine_similarity(&a, &b);

        assert!(similarity > 0.99 && similarity <= 1.0);
    }

    #[test]
    fn test_cosine_similarity_empty() {
        let empty: Vec<f32> = vec![];

        assert_eq!(cosine_similarity(&empty, &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn test_cosine_similarity_different_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_zero_norm() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_vector_norm() {
        assert!((vector_norm(&[3.0, 4.0]) - 5.0).abs() < f32::EPSILON);
        assert_eq!(vector_norm(&[]), 0.0);
    }

    #[test]
    fn test_with_norms_matches_direct() {
        let a = vec![1.0, 1.0, 0.0];
        let b = vec![1.0, 0.9, 0.1];

        let direct = cosine_similarity(&a, &b);
        let precomputed = cosine_similarity_with_norms(&a, vector_norm(&a), &b, vector_norm(&b));

        assert!((direct - precomputed).abs() < f32::EPSILON);
    }
}
