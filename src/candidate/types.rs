//! Candidate records and the derived state the pipeline attaches to them.
//!
//! A [`Candidate`] is the caller-owned, immutable input. Everything the
//! pipeline computes lives in [`ScoredCandidate`], which borrows the
//! candidate for the duration of one selection call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw per-candidate metrics, each on its own application-specific scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Meaning density (higher is better).
    #[serde(alias = "rho", alias = "rho_raw")]
    pub meaning_density: f64,
    /// Resonance between the content's modalities.
    #[serde(alias = "gamma", alias = "gamma_raw")]
    pub resonance: f64,
    /// Aesthetic alignment.
    #[serde(alias = "beta", alias = "beta_raw")]
    pub aesthetic_alignment: f64,
    /// Distance or cost to reach the candidate (lower is better).
    #[serde(alias = "d", alias = "d_raw")]
    pub distance: f64,
    /// Recombinability for downstream generations.
    #[serde(alias = "sigma", alias = "sigma_raw")]
    pub recombinability: f64,
    /// Binding score.
    #[serde(alias = "M", alias = "M_raw")]
    pub binding: f64,
    /// Description length (lower is better).
    #[serde(alias = "lambda", alias = "lambda_raw")]
    pub description_length: f64,
    /// Signed phase difference from the zero reference.
    #[serde(alias = "phi", alias = "phi_raw")]
    pub phase_difference: f64,
}

impl RawMetrics {
    /// Returns the raw value of a metric.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::MeaningDensity => self.meaning_density,
            Metric::Resonance => self.resonance,
            Metric::AestheticAlignment => self.aesthetic_alignment,
            Metric::Distance => self.distance,
            Metric::Recombinability => self.recombinability,
            Metric::Binding => self.binding,
            Metric::DescriptionLength => self.description_length,
            Metric::PhaseDifference => self.phase_difference,
        }
    }

    /// Returns the first metric whose raw value is NaN or infinite.
    pub fn first_non_finite(&self) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| !self.get(*m).is_finite())
    }
}

/// Names of the raw metrics a candidate carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MeaningDensity,
    Resonance,
    AestheticAlignment,
    Distance,
    Recombinability,
    Binding,
    DescriptionLength,
    PhaseDifference,
}

impl Metric {
    /// Every raw metric, in declaration order.
    pub const ALL: [Metric; 8] = [
        Metric::MeaningDensity,
        Metric::Resonance,
        Metric::AestheticAlignment,
        Metric::Distance,
        Metric::Recombinability,
        Metric::Binding,
        Metric::DescriptionLength,
        Metric::PhaseDifference,
    ];

    /// Metrics rescaled with pool min-max normalization.
    ///
    /// Phase difference is excluded: it is measured from a zero reference.
    pub const MIN_MAX: [Metric; 7] = [
        Metric::MeaningDensity,
        Metric::Resonance,
        Metric::AestheticAlignment,
        Metric::Distance,
        Metric::Recombinability,
        Metric::Binding,
        Metric::DescriptionLength,
    ];

    /// Short snake_case name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::MeaningDensity => "meaning_density",
            Metric::Resonance => "resonance",
            Metric::AestheticAlignment => "aesthetic_alignment",
            Metric::Distance => "distance",
            Metric::Recombinability => "recombinability",
            Metric::Binding => "binding",
            Metric::DescriptionLength => "description_length",
            Metric::PhaseDifference => "phase_difference",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One item competing for selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable unique identifier. Also the deterministic tie-breaker.
    pub id: String,

    /// Opaque content, never inspected by the pipeline.
    #[serde(default)]
    pub payload: serde_json::Value,

    /// Raw metrics as produced upstream.
    pub metrics: RawMetrics,

    /// Fixed-length vector used only for similarity comparisons.
    pub embedding: Vec<f64>,

    /// Marks a deliberate outlier that receives the exception boost.
    #[serde(default, alias = "exception")]
    pub is_exception: bool,
}

impl Candidate {
    /// Creates a candidate with an empty payload.
    pub fn new(id: impl Into<String>, metrics: RawMetrics, embedding: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            payload: serde_json::Value::Null,
            metrics,
            embedding,
            is_exception: false,
        }
    }

    /// Marks the candidate as an exception.
    pub fn with_exception(mut self, is_exception: bool) -> Self {
        self.is_exception = is_exception;
        self
    }

    /// Attaches an opaque payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Metrics after stage 1.
///
/// Min-max scaled values and the inverted scores lie in [0, 1].
/// `phase_difference` is the absolute raw deviation and has no upper bound.
///
/// `reachability` and `simplicity` are the inverted forms of `distance` and
/// `description_length`; both directions are kept so constraints can use
/// either.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NormalizedMetrics {
    pub meaning_density: f64,
    pub resonance: f64,
    pub aesthetic_alignment: f64,
    pub distance: f64,
    pub reachability: f64,
    pub recombinability: f64,
    pub binding: f64,
    pub description_length: f64,
    pub simplicity: f64,
    pub phase_difference: f64,
}

impl NormalizedMetrics {
    /// Stores a min-max normalized value and derives the inverted score
    /// where the metric is lower-is-better.
    pub(crate) fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::MeaningDensity => self.meaning_density = value,
            Metric::Resonance => self.resonance = value,
            Metric::AestheticAlignment => self.aesthetic_alignment = value,
            Metric::Distance => {
                self.distance = value;
                self.reachability = 1.0 - value;
            }
            Metric::Recombinability => self.recombinability = value,
            Metric::Binding => self.binding = value,
            Metric::DescriptionLength => {
                self.description_length = value;
                self.simplicity = 1.0 - value;
            }
            Metric::PhaseDifference => self.phase_difference = value,
        }
    }
}

/// A candidate together with the state derived for it during one call.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate<'a> {
    /// The untouched input record.
    pub candidate: &'a Candidate,
    /// Normalized (and, for exceptions, boosted) metrics.
    pub normalized: NormalizedMetrics,
    /// Distance from the reference distribution, in [0, 1].
    pub novelty: f64,
    /// Weighted composite score. Unbounded above when weights sum past 1.
    pub composite: f64,
}

impl<'a> ScoredCandidate<'a> {
    /// Wraps a candidate with its normalized metrics.
    pub fn new(candidate: &'a Candidate, normalized: NormalizedMetrics) -> Self {
        Self {
            candidate,
            normalized,
            novelty: 0.0,
            composite: 0.0,
        }
    }

    /// Identifier of the underlying candidate.
    pub fn id(&self) -> &str {
        &self.candidate.id
    }

    /// Whether the underlying candidate is flagged as an exception.
    pub fn is_exception(&self) -> bool {
        self.candidate.is_exception
    }

    /// Embedding of the underlying candidate.
    pub fn embedding(&self) -> &[f64] {
        &self.candidate.embedding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_metrics_get() {
        let metrics = RawMetrics {
            meaning_density: 0.1,
            resonance: 0.2,
            aesthetic_alignment: 0.3,
            distance: 0.4,
            recombinability: 0.5,
            binding: 0.6,
            description_length: 0.7,
            phase_difference: -0.8,
        };
        assert_eq!(metrics.get(Metric::MeaningDensity), 0.1);
        assert_eq!(metrics.get(Metric::Distance), 0.4);
        assert_eq!(metrics.get(Metric::PhaseDifference), -0.8);
        assert!(metrics.first_non_finite().is_none());
    }

    #[test]
    fn test_first_non_finite() {
        let metrics = RawMetrics {
            binding: f64::NAN,
            ..RawMetrics::default()
        };
        assert_eq!(metrics.first_non_finite(), Some(Metric::Binding));
    }

    #[test]
    fn test_normalized_set_derives_inverted_scores() {
        let mut normalized = NormalizedMetrics::default();
        normalized.set(Metric::Distance, 0.25);
        normalized.set(Metric::DescriptionLength, 0.75);

        assert_eq!(normalized.distance, 0.25);
        assert_eq!(normalized.reachability, 0.75);
        assert_eq!(normalized.description_length, 0.75);
        assert_eq!(normalized.simplicity, 0.25);
    }

    #[test]
    fn test_candidate_deserialize_with_aliases() {
        let json = serde_json::json!({
            "id": "gen_0",
            "metrics": {
                "rho_raw": 0.9, "gamma_raw": 0.5, "beta_raw": 0.4, "d_raw": 0.2,
                "sigma_raw": 0.3, "M_raw": 0.1, "lambda_raw": 0.6, "phi_raw": -0.2
            },
            "embedding": [1.0, 0.0],
            "exception": true
        });

        let candidate: Candidate = serde_json::from_value(json).expect("valid candidate");
        assert_eq!(candidate.id, "gen_0");
        assert!(candidate.is_exception);
        assert_eq!(candidate.metrics.meaning_density, 0.9);
        assert_eq!(candidate.metrics.phase_difference, -0.2);
        assert!(candidate.payload.is_null());
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(Metric::AestheticAlignment.to_string(), "aesthetic_alignment");
        assert_eq!(format!("{}", Metric::PhaseDifference), "phase_difference");
    }
}
