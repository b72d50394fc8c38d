//! Vector similarity and distance functions.
//!
//! The selector only needs a deterministic, symmetric similarity; cosine
//! similarity is the default and [`Similarity`] lets callers plug in another.

use ndarray::{Array2, ArrayView1};

/// Norm below which a vector is treated as the zero vector.
const ZERO_NORM: f64 = 1e-10;

/// Pairwise similarity between two embeddings.
///
/// Implementations must be deterministic and symmetric.
pub trait Similarity {
    /// Returns the similarity of `a` and `b`.
    fn similarity(&self, a: &[f64], b: &[f64]) -> f64;
}

/// Cosine similarity over raw embeddings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl Similarity for CosineSimilarity {
    fn similarity(&self, a: &[f64], b: &[f64]) -> f64 {
        cosine_similarity(ArrayView1::from(a), ArrayView1::from(b))
    }
}

impl<F> Similarity for F
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    fn similarity(&self, a: &[f64], b: &[f64]) -> f64 {
        self(a, b)
    }
}

/// Computes cosine similarity between two vectors.
///
/// Cosine similarity measures the angle between vectors,
/// ranging from -1 (opposite) to 1 (identical direction).
/// Zero vectors have similarity 0 with everything.
///
/// # Panics
///
/// Panics if vectors have different lengths.
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "Vectors must have the same length for cosine similarity"
    );

    let dot_product = a.dot(&b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();

    if norm_a < ZERO_NORM || norm_b < ZERO_NORM {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Computes Euclidean distance between two vectors.
///
/// # Panics
///
/// Panics if vectors have different lengths.
pub fn euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "Vectors must have the same length for Euclidean distance"
    );

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Computes the pairwise cosine similarity matrix of a batch of embeddings.
///
/// Each row of `embeddings` is one vector; the result is symmetric.
pub fn pairwise_cosine_similarity(embeddings: &Array2<f64>) -> Array2<f64> {
    let n = embeddings.nrows();
    let mut similarity_matrix = Array2::zeros((n, n));

    for i in 0..n {
        similarity_matrix[[i, i]] = 1.0;

        for j in (i + 1)..n {
            let sim = cosine_similarity(embeddings.row(i), embeddings.row(j));
            similarity_matrix[[i, j]] = sim;
            similarity_matrix[[j, i]] = sim;
        }
    }

    similarity_matrix
}

/// Computes the pairwise Euclidean distance matrix of a batch of embeddings.
pub fn pairwise_euclidean_distance(embeddings: &Array2<f64>) -> Array2<f64> {
    let n = embeddings.nrows();
    let mut distance_matrix = Array2::zeros((n, n));

    for i in 0..n {
        for j in (i + 1)..n {
            let dist = euclidean_distance(embeddings.row(i), embeddings.row(j));
            distance_matrix[[i, j]] = dist;
            distance_matrix[[j, i]] = dist;
        }
    }

    distance_matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let b = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let sim = cosine_similarity(a.view(), b.view());
        assert!((sim - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = Array1::from_vec(vec![1.0, 0.0, 0.0]);
        let b = Array1::from_vec(vec![0.0, 1.0, 0.0]);
        assert!(cosine_similarity(a.view(), b.view()).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let b = Array1::from_vec(vec![-1.0, -2.0, -3.0]);
        let sim = cosine_similarity(a.view(), b.view());
        assert!((sim + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let b = Array1::from_vec(vec![0.0, 0.0, 0.0]);
        assert_eq!(cosine_similarity(a.view(), b.view()), 0.0);
    }

    #[test]
    #[should_panic(expected = "Vectors must have the same length")]
    fn test_cosine_similarity_different_lengths() {
        let a = Array1::from_vec(vec![1.0, 2.0]);
        let b = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        cosine_similarity(a.view(), b.view());
    }

    #[test]
    fn test_cosine_trait_is_symmetric() {
        let a = [0.3, -1.2, 4.0, 0.5];
        let b = [2.0, 0.1, -0.7, 1.1];
        let sim = CosineSimilarity;
        assert_eq!(sim.similarity(&a, &b), sim.similarity(&b, &a));
    }

    #[test]
    fn test_closure_similarity() {
        let constant = |_: &[f64], _: &[f64]| 0.25;
        assert_eq!(constant.similarity(&[1.0], &[2.0]), 0.25);
    }

    #[test]
    fn test_euclidean_distance_unit_apart() {
        let a = Array1::from_vec(vec![0.0, 0.0, 0.0]);
        let b = Array1::from_vec(vec![1.0, 0.0, 0.0]);
        assert!((euclidean_distance(a.view(), b.view()) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_pairwise_cosine_similarity() {
        let embeddings = Array2::from_shape_vec(
            (3, 4),
            vec![
                1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.707, 0.707, 0.0, 0.0,
            ],
        )
        .expect("Failed to create array");

        let sim_matrix = pairwise_cosine_similarity(&embeddings);
        assert_eq!(sim_matrix.shape(), &[3, 3]);

        for i in 0..3 {
            assert!((sim_matrix[[i, i]] - 1.0).abs() < 1e-10);
            for j in 0..3 {
                assert!((sim_matrix[[i, j]] - sim_matrix[[j, i]]).abs() < 1e-10);
            }
        }
        assert!(sim_matrix[[0, 1]].abs() < 1e-10);
    }

    #[test]
    fn test_pairwise_euclidean_distance() {
        let embeddings = Array2::from_shape_vec((2, 3), vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0])
            .expect("Failed to create array");

        let dist_matrix = pairwise_euclidean_distance(&embeddings);
        assert_eq!(dist_matrix.shape(), &[2, 2]);
        assert!(dist_matrix[[0, 0]] < 1e-10);
        assert!((dist_matrix[[0, 1]] - 1.0).abs() < 1e-10);
    }
}
