//! Cosine similarity between embedding vectors.

/// Calculate cosine similarity between two vectors.
///
/// Returns the dot product divided by the product of Euclidean norms, in
/// [-1, 1]. Degenerate inputs — mismatched lengths or a zero-norm vector —
/// return 0.0 rather than NaN, so a NaN can never reach the ranking sort.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::debug!(
            "Cosine similarity over mismatched lengths ({} vs {})",
            a.len(),
            b.len()
        );
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    // Guard the product, not just the factors: with subnormal norms the
    // product itself can underflow to zero.
    let denominator = norm_a * norm_b;
    if denominator == 0.0 {
        return 0.0;
    }

    dot_product / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_vectors() {
        let a = vec![0.5, 0.5];
        let b = vec![-0.5, -0.5];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_symmetry() {
        let a = vec![0.3, -0.7, 0.2, 0.9];
        let b = vec![-0.1, 0.4, 0.8, -0.6];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_zero_norm_returns_zero() {
        let zero = vec![0.0, 0.0, 0.0];
        let a = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &a), 0.0);
        assert_eq!(cosine_similarity(&a, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_length_mismatch_returns_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_never_nan() {
        let cases: Vec<(Vec<f32>, Vec<f32>)> = vec![
            (vec![], vec![]),
            (vec![0.0], vec![0.0]),
            (vec![1e-30, 0.0], vec![0.0, 1e-30]),
        ];
        for (a, b) in cases {
            assert!(!cosine_similarity(&a, &b).is_nan());
        }
    }
}
