//! Stage 6: human-readable audit trail for the selected candidates.

use serde::{Deserialize, Serialize};

use super::types::SelectedCandidate;

/// Marker appended to the rationale of exception candidates.
pub const EXCEPTION_MARKER: &str = "[EXCEPTION]: Selected as a high-density exception point.";

/// One entry per selected candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    /// 1-based position in the selection order.
    pub rank: usize,
    /// Composite score, 4 decimal places.
    pub composite: f64,
    pub is_exception: bool,
    /// Novelty after boosting, 2 decimal places.
    pub novelty: f64,
    /// Normalized (and boosted) meaning density, 2 decimal places.
    pub meaning_density: f64,
    /// Marginal score at the time of the pick, 4 decimal places.
    pub marginal_score: f64,
    pub rationale: String,
}

/// Rounds half away from zero to the given number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Builds audit records. Reads the selection, never changes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic rationale for one pick.
    pub fn explain(&self, selected: &SelectedCandidate<'_>) -> String {
        let scored = &selected.scored;
        let n = &scored.normalized;
        let mut text = format!(
            "High novelty ({:.2}) and meaning density ({:.2}). \
             Recombinability ({:.2}) is promising. Reachability ({:.2}) is sufficient.",
            scored.novelty, n.meaning_density, n.recombinability, n.reachability
        );
        if scored.is_exception() {
            text.push(' ');
            text.push_str(EXCEPTION_MARKER);
        }
        text
    }

    /// Audit record for one pick.
    pub fn record(&self, selected: &SelectedCandidate<'_>) -> AuditRecord {
        let scored = &selected.scored;
        AuditRecord {
            id: scored.id().to_string(),
            rank: selected.rank,
            composite: round_to(scored.composite, 4),
            is_exception: scored.is_exception(),
            novelty: round_to(scored.novelty, 2),
            meaning_density: round_to(scored.normalized.meaning_density, 2),
            marginal_score: round_to(selected.marginal_score, 4),
            rationale: self.explain(selected),
        }
    }

    /// Audit records for a whole selection, same order.
    pub fn generate(&self, selected: &[SelectedCandidate<'_>]) -> Vec<AuditRecord> {
        selected.iter().map(|s| self.record(s)).collect()
    }
}
