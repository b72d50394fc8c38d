//! Stage 4: weighted composite scoring.

use crate::candidate::ScoredCandidate;

use super::config::{MetricWeights, ScoreTerm};

/// Combines normalized metrics into one scalar per candidate.
///
/// The composite is `sum(weight[t] * value[t])` with the weights used as
/// given, so its upper bound is the sum of the weights, not 1.
#[derive(Debug, Clone)]
pub struct CompositeScorer {
    weights: MetricWeights,
}

impl CompositeScorer {
    /// Creates a scorer for a weight set.
    pub fn new(weights: MetricWeights) -> Self {
        Self { weights }
    }

    /// Value of a single score term for a candidate.
    pub fn term_value(candidate: &ScoredCandidate<'_>, term: ScoreTerm) -> f64 {
        let n = &candidate.normalized;
        match term {
            ScoreTerm::Novelty => candidate.novelty,
            ScoreTerm::MeaningDensity => n.meaning_density,
            ScoreTerm::Recombinability => n.recombinability,
            ScoreTerm::Reachability => n.reachability,
            ScoreTerm::Resonance => n.resonance,
            ScoreTerm::Simplicity => n.simplicity,
            ScoreTerm::AestheticAlignment => n.aesthetic_alignment,
            ScoreTerm::Binding => n.binding,
        }
    }

    /// Computes the composite score of a candidate.
    pub fn score(&self, candidate: &ScoredCandidate<'_>) -> f64 {
        self.weights
            .iter()
            .map(|(term, weight)| weight * Self::term_value(candidate, term))
            .sum()
    }

    /// Scores every candidate in the pool in place.
    pub fn apply(&self, pool: &mut [ScoredCandidate<'_>]) {
        for candidate in pool.iter_mut() {
            candidate.composite = self.score(candidate);
        }

        tracing::debug!(
            candidates = pool.len(),
            weight_total = self.weights.total(),
            "Computed composite scores"
        );
    }
}
