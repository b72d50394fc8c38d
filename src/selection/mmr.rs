//! Stage 5: diversity-aware greedy selection (Maximal Marginal Relevance).
//!
//! Algorithm:
//! 1. Order the pool by composite score, descending, ties by id ascending
//! 2. Take the top candidate unconditionally
//! 3. For every later slot pick the remaining candidate maximizing
//!    `alpha * composite - (1 - alpha) * max_sim`, where `max_sim` is its
//!    highest similarity to anything already picked (ties by id ascending)
//! 4. Stop at `k` picks or when the pool runs out
//!
//! Rounds depend on each other and run sequentially. Within a round only the
//! newest pick has to be compared against the remaining candidates, so
//! `max_sim` is updated incrementally.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::candidate::ScoredCandidate;
use crate::diversity::{CosineSimilarity, Similarity};

use super::types::SelectedCandidate;

/// Similarity assumed when the similarity function returns NaN or infinity.
/// The candidate is treated as a duplicate of the newest pick.
pub const NON_FINITE_SIMILARITY: f64 = 1.0;

/// Greedy MMR selector.
#[derive(Debug, Clone)]
pub struct DiversitySelector<S = CosineSimilarity> {
    alpha: f64,
    k: usize,
    similarity: S,
}

impl DiversitySelector<CosineSimilarity> {
    /// Creates a selector using cosine similarity.
    pub fn new(alpha: f64, k: usize) -> Self {
        Self::with_similarity(alpha, k, CosineSimilarity)
    }
}

/// Composite descending, then id ascending.
fn by_score_then_id(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    OrderedFloat(b.composite)
        .cmp(&OrderedFloat(a.composite))
        .then_with(|| a.id().cmp(b.id()))
}

impl<S: Similarity> DiversitySelector<S> {
    /// Creates a selector with a custom similarity function.
    pub fn with_similarity(alpha: f64, k: usize, similarity: S) -> Self {
        Self {
            alpha,
            k,
            similarity,
        }
    }

    /// Marginal score of a candidate given its similarity to the selection.
    pub fn marginal_score(&self, composite: f64, max_similarity: f64) -> f64 {
        self.alpha * composite - (1.0 - self.alpha) * max_similarity
    }

    /// Selects up to `k` candidates from the pool.
    ///
    /// The result has `min(k, pool.len())` entries, no duplicates, and starts
    /// with the highest composite scorer.
    pub fn select<'a>(&self, pool: Vec<ScoredCandidate<'a>>) -> Vec<SelectedCandidate<'a>> {
        let target = self.k.min(pool.len());
        let mut selected: Vec<SelectedCandidate<'a>> = Vec::with_capacity(target);
        if target == 0 {
            return selected;
        }

        let mut remaining = pool;
        remaining.sort_by(by_score_then_id);

        let top = remaining.remove(0);
        tracing::trace!(id = %top.id(), composite = top.composite, "Selected top candidate");
        selected.push(SelectedCandidate {
            marginal_score: self.marginal_score(top.composite, 0.0),
            max_similarity: 0.0,
            rank: 1,
            scored: top,
        });

        // Highest similarity of each remaining candidate to the selection so far.
        let mut max_sim: Vec<f64> = vec![f64::NEG_INFINITY; remaining.len()];

        while selected.len() < target && !remaining.is_empty() {
            let newest = selected[selected.len() - 1].scored.embedding();
            for (candidate, sim) in remaining.iter().zip(max_sim.iter_mut()) {
                let value = self.similarity.similarity(candidate.embedding(), newest);
                let value = if value.is_finite() {
                    value
                } else {
                    tracing::warn!(
                        id = %candidate.id(),
                        "Similarity function returned a non-finite value, using {}",
                        NON_FINITE_SIMILARITY
                    );
                    NON_FINITE_SIMILARITY
                };
                *sim = sim.max(value);
            }

            let best = remaining
                .iter()
                .zip(max_sim.iter())
                .enumerate()
                .max_by(|(_, (a, sim_a)), (_, (b, sim_b))| {
                    let mmr_a = OrderedFloat(self.marginal_score(a.composite, **sim_a));
                    let mmr_b = OrderedFloat(self.marginal_score(b.composite, **sim_b));
                    mmr_a.cmp(&mmr_b).then_with(|| b.id().cmp(a.id()))
                })
                .map(|(idx, _)| idx);

            let Some(idx) = best else {
                break;
            };

            let scored = remaining.remove(idx);
            let similarity = max_sim.remove(idx);
            let marginal_score = self.marginal_score(scored.composite, similarity);

            tracing::trace!(
                id = %scored.id(),
                composite = scored.composite,
                max_similarity = similarity,
                marginal_score = marginal_score,
                "Selected candidate by marginal relevance"
            );

            selected.push(SelectedCandidate {
                rank: selected.len() + 1,
                marginal_score,
                max_similarity: similarity,
                scored,
            });
        }

        selected
    }
}
