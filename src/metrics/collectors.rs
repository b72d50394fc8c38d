//! High-level recording interface over the raw Prometheus metrics.

use super::prometheus::{
    CANDIDATES_TOTAL, COMPOSITE_SCORE, DEGENERATE_METRICS_TOTAL, FILTER_FALLBACKS_TOTAL,
    RUNS_TOTAL, RUN_DURATION,
};
use crate::selection::{SelectionOutcome, SelectionWarning};

/// Records selection run metrics.
///
/// Every method is a no-op until `init_metrics()` has been called, so the
/// library can record unconditionally.
///
/// # Example
///
/// ```ignore
/// use select_forge::metrics::{init_metrics, MetricsCollector};
///
/// init_metrics().expect("Failed to init metrics");
/// let collector = MetricsCollector::new();
/// collector.record_run("success", 0.002);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    pub fn new() -> Self {
        Self
    }

    /// Record one selection run with its outcome label and duration.
    pub fn record_run(&self, outcome: &str, duration_secs: f64) {
        if let Some(runs) = RUNS_TOTAL.get() {
            runs.with_label_values(&[outcome]).inc();
        }

        if let Some(duration) = RUN_DURATION.get() {
            duration.observe(duration_secs);
        }

        tracing::trace!(
            outcome = outcome,
            duration_secs = duration_secs,
            "Recorded run metric"
        );
    }

    /// Record how many candidates reached a pipeline stage.
    pub fn record_stage(&self, stage: &str, count: usize) {
        if let Some(candidates) = CANDIDATES_TOTAL.get() {
            candidates.with_label_values(&[stage]).inc_by(count as f64);
        }
    }

    /// Record a constraint-filter fallback.
    pub fn record_fallback(&self) {
        if let Some(fallbacks) = FILTER_FALLBACKS_TOTAL.get() {
            fallbacks.inc();
        }
    }

    /// Record a degenerate metric by name.
    pub fn record_degenerate_metric(&self, metric: &str) {
        if let Some(degenerate) = DEGENERATE_METRICS_TOTAL.get() {
            degenerate.with_label_values(&[metric]).inc();
        }
    }

    /// Record the composite score of a selected candidate.
    pub fn record_composite(&self, score: f64) {
        if let Some(histogram) = COMPOSITE_SCORE.get() {
            histogram.observe(score);
        }
    }

    /// Record everything a successful selection call produced.
    pub fn record_selection(&self, outcome: &SelectionOutcome<'_>, duration_secs: f64) {
        self.record_run("success", duration_secs);
        self.record_stage("input", outcome.pool_size);
        self.record_stage("filtered", outcome.filtered_size);
        self.record_stage("selected", outcome.selected.len());

        if outcome.fallback_triggered {
            self.record_fallback();
        }

        for warning in &outcome.warnings {
            if let SelectionWarning::DegenerateMetric { metric, .. } = warning {
                self.record_degenerate_metric(metric.as_str());
            }
        }

        for selected in &outcome.selected {
            self.record_composite(selected.scored.composite);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::prometheus::init_metrics;

    fn ensure_metrics_init() {
        let _ = init_metrics();
    }

    #[test]
    fn test_metrics_collector_new() {
        let collector = MetricsCollector::new();
        assert!(std::mem::size_of_val(&collector) == 0);
    }

    #[test]
    fn test_record_run() {
        ensure_metrics_init();
        let collector = MetricsCollector::new();

        collector.record_run("success", 0.004);
        collector.record_run("error", 0.001);
    }

    #[test]
    fn test_record_stages_and_scores() {
        ensure_metrics_init();
        let collector = MetricsCollector::new();

        collector.record_stage("input", 100);
        collector.record_stage("filtered", 40);
        collector.record_stage("selected", 5);
        collector.record_fallback();
        collector.record_degenerate_metric("resonance");
        collector.record_composite(0.62);

        let text = crate::metrics::export_metrics();
        assert!(text.contains("select_forge_candidates_total"));
        assert!(text.contains("select_forge_filter_fallbacks_total"));
    }

    #[test]
    fn test_record_selection_outcome() {
        ensure_metrics_init();
        let collector = MetricsCollector::new();

        let mut outcome = SelectionOutcome::empty();
        outcome.fallback_triggered = true;
        outcome.warnings.push(SelectionWarning::DegenerateMetric {
            metric: crate::candidate::Metric::Binding,
            value: 0.5,
        });
        collector.record_selection(&outcome, 0.0);

        let text = crate::metrics::export_metrics();
        assert!(text.contains("select_forge_degenerate_metrics_total"));
    }
}
