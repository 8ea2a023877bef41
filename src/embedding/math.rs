//! Vector math shared by the embedders and the in-memory index.

use crate::error::{AlexandriaError, Result};

/// Scale a vector to unit length in place. A zero vector is left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Elementwise mean of a set of equal-length vectors.
pub fn mean_pool(vectors: &[Vec<f32>]) -> Result<Vec<f32>> {
    let first = vectors
        .first()
        .ok_or_else(|| AlexandriaError::invalid_argument("mean_pool requires at least one vector"))?;

    let dimension = first.len();
    let mut pooled = vec![0.0f32; dimension];
    for vector in vectors {
        if vector.len() != dimension {
            return Err(AlexandriaError::invalid_argument(format!(
                "mean_pool dimension mismatch: expected {dimension}, got {}",
                vector.len()
            )));
        }
        for (acc, x) in pooled.iter_mut().zip(vector) {
            *acc += x;
        }
    }

    let count = vectors.len() as f32;
    for acc in pooled.iter_mut() {
        *acc /= count;
    }
    Ok(pooled)
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero norm, so an empty-text embedding
/// never ranks above a real match.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_produces_unit_length() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_leaves_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn mean_pool_averages_elementwise() {
        let pooled = mean_pool(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(pooled, vec![0.5, 0.5]);
    }

    #[test]
    fn mean_pool_rejects_empty_input() {
        assert!(mean_pool(&[]).is_err());
    }

    #[test]
    fn mean_pool_rejects_mismatched_dimensions() {
        assert!(mean_pool(&[vec![1.0, 0.0], vec![1.0]]).is_err());
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![0.2, -0.4, 0.7];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_with_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
