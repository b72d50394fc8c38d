//! Stage 3: hard-constraint filtering with an empty-pool fallback.

use crate::candidate::ScoredCandidate;

use super::config::HardConstraints;

/// Result of applying the hard constraints to a pool.
#[derive(Debug, Clone)]
pub struct FilterOutcome<'a> {
    /// Candidates that go on to scoring.
    pub pool: Vec<ScoredCandidate<'a>>,
    /// Number of candidates that failed at least one constraint.
    pub rejected: usize,
    /// Set when nothing passed and the unfiltered pool was returned instead.
    pub fallback_triggered: bool,
}

/// Keeps candidates with aesthetic >= `beta_min`, resonance >= `gamma_min`
/// and phase difference <= `phi_tol`.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintFilter {
    constraints: HardConstraints,
}

impl ConstraintFilter {
    /// Creates a filter for the given thresholds.
    pub fn new(constraints: HardConstraints) -> Self {
        Self { constraints }
    }

    /// Returns whether a candidate satisfies all three constraints.
    pub fn passes(&self, candidate: &ScoredCandidate<'_>) -> bool {
        let n = &candidate.normalized;
        n.aesthetic_alignment >= self.constraints.beta_min
            && n.resonance >= self.constraints.gamma_min
            && n.phase_difference <= self.constraints.phi_tol
    }

    /// Applies the constraints.
    ///
    /// If no candidate passes, the full input pool is returned with
    /// `fallback_triggered` set. Only an empty result triggers the fallback,
    /// a result smaller than the target size does not. An empty input stays
    /// empty.
    pub fn apply<'a>(&self, pool: Vec<ScoredCandidate<'a>>) -> FilterOutcome<'a> {
        let total = pool.len();
        let (passed, failed): (Vec<_>, Vec<_>) = pool.into_iter().partition(|c| self.passes(c));

        if passed.is_empty() && !failed.is_empty() {
            tracing::warn!(
                candidates = total,
                beta_min = self.constraints.beta_min,
                gamma_min = self.constraints.gamma_min,
                phi_tol = self.constraints.phi_tol,
                "All candidates failed hard constraints, falling back to the unfiltered pool"
            );
            return FilterOutcome {
                pool: failed,
                rejected: total,
                fallback_triggered: true,
            };
        }

        tracing::debug!(
            passed = passed.len(),
            rejected = failed.len(),
            "Applied hard constraints"
        );

        FilterOutcome {
            rejected: failed.len(),
            pool: passed,
            fallback_triggered: false,
        }
    }
}
