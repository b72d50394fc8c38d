//! Stage 2: novelty scoring and exception boosting.
//!
//! Exceptions are deliberate outliers. Instead of being filtered as noise
//! they are treated as unusually information-dense: their meaning density
//! and novelty are multiplied by the boost factor (capped at 1.0). This runs
//! before constraint filtering, so a boost can change what passes.

use crate::candidate::ScoredCandidate;
use crate::diversity::{CentroidNovelty, NoveltyEstimator, ReferenceStats};

/// Computes novelty for every candidate and boosts exceptions.
#[derive(Debug, Clone)]
pub struct ExceptionBooster<N = CentroidNovelty> {
    boost: f64,
    estimator: N,
}

impl ExceptionBooster<CentroidNovelty> {
    /// Creates a booster using centroid-distance novelty.
    pub fn new(boost: f64) -> Self {
        Self {
            boost,
            estimator: CentroidNovelty,
        }
    }
}

impl<N: NoveltyEstimator> ExceptionBooster<N> {
    /// Creates a booster with a custom novelty estimator.
    pub fn with_estimator(boost: f64, estimator: N) -> Self {
        Self { boost, estimator }
    }

    /// Returns the boost multiplier.
    pub fn boost(&self) -> f64 {
        self.boost
    }

    /// Scores novelty for the whole pool and boosts exceptions in place.
    ///
    /// Returns the number of exception candidates that were boosted.
    pub fn apply(&self, pool: &mut [ScoredCandidate<'_>], reference: &ReferenceStats) -> usize {
        let mut boosted = 0;

        for scored in pool.iter_mut() {
            let novelty = self.estimator.novelty(scored.embedding(), reference);
            scored.novelty = if novelty.is_finite() {
                novelty.clamp(0.0, 1.0)
            } else {
                tracing::warn!(
                    id = %scored.id(),
                    "Novelty estimator returned a non-finite value, using 0"
                );
                0.0
            };

            if scored.is_exception() {
                scored.normalized.meaning_density =
                    (scored.normalized.meaning_density * self.boost).min(1.0);
                scored.novelty = (scored.novelty * self.boost).min(1.0);
                boosted += 1;
            }
        }

        tracing::debug!(
            candidates = pool.len(),
            boosted = boosted,
            boost = self.boost,
            "Scored novelty and boosted exceptions"
        );

        boosted
    }
}
