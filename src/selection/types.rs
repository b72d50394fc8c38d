//! Result types shared by the selection stages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, Metric, ScoredCandidate};

use super::audit::AuditRecord;

/// Non-fatal conditions raised during a selection call.
///
/// Processing always continues after a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionWarning {
    /// No candidate satisfied the hard constraints; the unfiltered pool was used.
    EmptyPool { pool_size: usize },
    /// Every candidate had the same raw value for a metric; it normalizes to 0.
    DegenerateMetric { metric: Metric, value: f64 },
}

impl fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionWarning::EmptyPool { pool_size } => write!(
                f,
                "all {} candidates failed the hard constraints; using the unfiltered pool",
                pool_size
            ),
            SelectionWarning::DegenerateMetric { metric, value } => write!(
                f,
                "metric '{}' is constant ({}) across the pool; normalized to 0",
                metric, value
            ),
        }
    }
}

/// A candidate picked by the diversity selector.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedCandidate<'a> {
    /// The scored candidate.
    pub scored: ScoredCandidate<'a>,
    /// 1-based position in the selection order.
    pub rank: usize,
    /// `alpha * composite - (1 - alpha) * max_similarity` at the time of the pick.
    pub marginal_score: f64,
    /// Highest similarity to the candidates picked before it (0 for the first).
    pub max_similarity: f64,
}

impl<'a> SelectedCandidate<'a> {
    /// Identifier of the underlying candidate.
    pub fn id(&self) -> &str {
        self.scored.id()
    }

    /// The untouched input record.
    pub fn candidate(&self) -> &'a Candidate {
        self.scored.candidate
    }
}

/// Everything produced by one selection call.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionOutcome<'a> {
    /// Selected candidates, in selection order.
    pub selected: Vec<SelectedCandidate<'a>>,
    /// One audit record per selected candidate, same order.
    pub audit: Vec<AuditRecord>,
    /// Non-fatal conditions raised along the way.
    pub warnings: Vec<SelectionWarning>,
    /// Number of candidates supplied.
    pub pool_size: usize,
    /// Number of candidates that reached scoring.
    pub filtered_size: usize,
    /// Whether the constraint filter fell back to the unfiltered pool.
    pub fallback_triggered: bool,
}

impl<'a> SelectionOutcome<'a> {
    /// An outcome with nothing selected.
    pub(crate) fn empty() -> Self {
        Self {
            selected: Vec::new(),
            audit: Vec::new(),
            warnings: Vec::new(),
            pool_size: 0,
            filtered_size: 0,
            fallback_triggered: false,
        }
    }

    /// The selected input records, in selection order.
    pub fn candidates(&self) -> impl Iterator<Item = &'a Candidate> + '_ {
        self.selected.iter().map(|s| s.candidate())
    }

    /// Identifiers of the selected candidates, in selection order.
    pub fn ids(&self) -> Vec<&str> {
        self.selected.iter().map(|s| s.id()).collect()
    }
}
