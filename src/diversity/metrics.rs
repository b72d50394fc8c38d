//! Diversity metrics for a selected subset.
//!
//! Summarizes how spread out a selection is in embedding space, so that
//! different configurations can be compared on the same pool.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

use super::similarity::{pairwise_cosine_similarity, pairwise_euclidean_distance};

/// Diversity summary of a set of candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionDiversity {
    /// Number of candidates analyzed.
    pub count: usize,

    /// Mean cosine similarity over all unordered pairs.
    pub average_pairwise_similarity: f64,

    /// Highest cosine similarity between any two candidates.
    /// Lower values indicate a less redundant selection.
    pub max_pairwise_similarity: f64,

    /// Mean Euclidean distance over all unordered pairs.
    pub average_pairwise_distance: f64,

    /// Fraction of candidates flagged as exceptions (0.0 to 1.0).
    pub exception_share: f64,
}

impl SelectionDiversity {
    /// Calculates diversity metrics for a set of candidates.
    ///
    /// All embeddings must have the same length. Fewer than two candidates
    /// yield zero pairwise statistics.
    pub fn calculate<'a, I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a Candidate>,
    {
        let candidates: Vec<&Candidate> = candidates.into_iter().collect();
        if candidates.is_empty() {
            return Self::empty();
        }

        let exceptions = candidates.iter().filter(|c| c.is_exception).count();
        let exception_share = exceptions as f64 / candidates.len() as f64;

        let dimension = candidates[0].embedding.len();
        let mut embeddings = Array2::<f64>::zeros((candidates.len(), dimension));
        for (i, candidate) in candidates.iter().enumerate() {
            for (j, value) in candidate.embedding.iter().take(dimension).enumerate() {
                embeddings[[i, j]] = *value;
            }
        }

        let similarities = pairwise_cosine_similarity(&embeddings);
        let distances = pairwise_euclidean_distance(&embeddings);

        let (average_pairwise_similarity, max_pairwise_similarity) =
            upper_triangle_mean_max(&similarities);
        let (average_pairwise_distance, _) = upper_triangle_mean_max(&distances);

        Self {
            count: candidates.len(),
            average_pairwise_similarity,
            max_pairwise_similarity,
            average_pairwise_distance,
            exception_share,
        }
    }

    /// Returns empty metrics.
    fn empty() -> Self {
        Self {
            count: 0,
            average_pairwise_similarity: 0.0,
            max_pairwise_similarity: 0.0,
            average_pairwise_distance: 0.0,
            exception_share: 0.0,
        }
    }
}

/// Mean and maximum of the strict upper triangle of a square matrix.
fn upper_triangle_mean_max(matrix: &Array2<f64>) -> (f64, f64) {
    let n = matrix.nrows();
    if n < 2 {
        return (0.0, 0.0);
    }

    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut count = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            let value = matrix[[i, j]];
            sum += value;
            max = max.max(value);
            count += 1;
        }
    }

    (sum / count as f64, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::RawMetrics;

    fn candidate(id: &str, embedding: Vec<f64>, is_exception: bool) -> Candidate {
        Candidate::new(id, RawMetrics::default(), embedding).with_exception(is_exception)
    }

    #[test]
    fn test_empty_selection() {
        let metrics = SelectionDiversity::calculate(&Vec::<Candidate>::new());
        assert_eq!(metrics.count, 0);
        assert_eq!(metrics.exception_share, 0.0);
    }

    #[test]
    fn test_single_candidate() {
        let pool = [candidate("a", vec![1.0, 0.0], true)];
        let metrics = SelectionDiversity::calculate(&pool);
        assert_eq!(metrics.count, 1);
        assert_eq!(metrics.average_pairwise_similarity, 0.0);
        assert_eq!(metrics.exception_share, 1.0);
    }

    #[test]
    fn test_orthogonal_selection() {
        let pool = [
            candidate("a", vec![1.0, 0.0, 0.0], false),
            candidate("b", vec![0.0, 1.0, 0.0], false),
            candidate("c", vec![0.0, 0.0, 1.0], true),
            candidate("d", vec![1.0, 0.0, 0.0], false),
        ];
        let metrics = SelectionDiversity::calculate(&pool);

        assert_eq!(metrics.count, 4);
        // Only the (a, d) pair is similar: 1 of 6 pairs.
        assert!((metrics.average_pairwise_similarity - 1.0 / 6.0).abs() < 1e-10);
        assert!((metrics.max_pairwise_similarity - 1.0).abs() < 1e-10);
        assert!((metrics.exception_share - 0.25).abs() < 1e-10);
        assert!(metrics.average_pairwise_distance > 0.0);
    }
}
