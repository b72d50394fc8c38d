//! Stage 1: rescale raw metrics to a common [0, 1] scale.

use std::collections::BTreeMap;

use ndarray::{Array2, Axis};

use crate::candidate::{Candidate, Metric, NormalizedMetrics, ScoredCandidate};

use super::types::SelectionWarning;

/// Ranges narrower than this are treated as degenerate.
const DEGENERATE_RANGE_EPSILON: f64 = 1e-9;

/// Observed range of one metric across the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    /// Half the width of the range. Halving first keeps ranges spanning most
    /// of the f64 domain finite.
    fn half_span(&self) -> f64 {
        self.max * 0.5 - self.min * 0.5
    }

    /// Divisor for halved min-max scaling, 0.5 for degenerate ranges.
    fn divisor(&self) -> f64 {
        if self.is_degenerate() {
            0.5
        } else {
            self.half_span()
        }
    }

    /// Whether every value in the pool is (numerically) the same.
    pub fn is_degenerate(&self) -> bool {
        self.half_span() <= DEGENERATE_RANGE_EPSILON * 0.5
    }

    /// Scales a raw value into [0, 1].
    pub fn scale(&self, raw: f64) -> f64 {
        ((raw * 0.5 - self.min * 0.5) / self.divisor()).clamp(0.0, 1.0)
    }
}

/// Result of normalizing a pool.
#[derive(Debug, Clone)]
pub struct Normalization<'a> {
    /// One entry per input candidate, input order preserved.
    pub scored: Vec<ScoredCandidate<'a>>,
    /// Range observed for every min-max normalized metric.
    pub ranges: BTreeMap<Metric, MetricRange>,
    /// Degenerate-metric warnings.
    pub warnings: Vec<SelectionWarning>,
}

/// Min-max normalizer over a configurable metric set.
///
/// Distance and description length are lower-is-better; their inverted
/// scores (reachability, simplicity) are derived alongside the direct value.
/// Phase difference is never min-max scaled: its normalized value is the
/// absolute raw deviation from zero.
#[derive(Debug, Clone)]
pub struct MetricNormalizer {
    metrics: Vec<Metric>,
}

impl Default for MetricNormalizer {
    fn default() -> Self {
        Self::new(Metric::MIN_MAX)
    }
}

impl MetricNormalizer {
    /// Creates a normalizer for the given metrics.
    ///
    /// Phase difference is ignored here since it has its own rule.
    pub fn new(metrics: impl IntoIterator<Item = Metric>) -> Self {
        let mut metrics: Vec<Metric> = metrics
            .into_iter()
            .filter(|m| *m != Metric::PhaseDifference)
            .collect();
        metrics.sort();
        metrics.dedup();
        Self { metrics }
    }

    /// Metrics this normalizer rescales.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Normalizes every candidate in the pool.
    ///
    /// Inputs are not modified. An empty pool yields an empty result.
    pub fn normalize<'a>(&self, candidates: &'a [Candidate]) -> Normalization<'a> {
        let mut result = Normalization {
            scored: Vec::with_capacity(candidates.len()),
            ranges: BTreeMap::new(),
            warnings: Vec::new(),
        };

        if candidates.is_empty() {
            return result;
        }

        let raw = Array2::from_shape_fn((candidates.len(), self.metrics.len()), |(i, j)| {
            candidates[i].metrics.get(self.metrics[j])
        });

        for (j, column) in raw.axis_iter(Axis(1)).enumerate() {
            let metric = self.metrics[j];
            let range = MetricRange {
                min: column.fold(f64::INFINITY, |acc, &v| acc.min(v)),
                max: column.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v)),
            };

            if range.is_degenerate() {
                tracing::warn!(
                    metric = %metric,
                    value = range.min,
                    "Degenerate metric across pool, normalizing to 0"
                );
                result.warnings.push(SelectionWarning::DegenerateMetric {
                    metric,
                    value: range.min,
                });
            }

            result.ranges.insert(metric, range);
        }

        for (i, candidate) in candidates.iter().enumerate() {
            let mut normalized = NormalizedMetrics::default();
            for (j, metric) in self.metrics.iter().enumerate() {
                normalized.set(*metric, result.ranges[metric].scale(raw[[i, j]]));
            }
            normalized.set(
                Metric::PhaseDifference,
                candidate.metrics.phase_difference.abs(),
            );
            result.scored.push(ScoredCandidate::new(candidate, normalized));
        }

        tracing::debug!(
            candidates = candidates.len(),
            metrics = self.metrics.len(),
            degenerate = result.warnings.len(),
            "Normalized candidate metrics"
        );

        result
    }
}
