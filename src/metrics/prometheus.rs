//! Prometheus metrics registration and export.
//!
//! This module defines all Prometheus metrics used by select_forge and provides
//! functions for initializing, registering, and exporting metrics.

use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all select_forge metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Total selection runs, labeled by outcome (success / error).
pub static RUNS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Candidates seen per pipeline stage (input / filtered / selected).
pub static CANDIDATES_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Runs in which the constraint filter fell back to the unfiltered pool.
pub static FILTER_FALLBACKS_TOTAL: OnceLock<Counter> = OnceLock::new();

/// Degenerate metrics encountered during normalization, labeled by metric.
pub static DEGENERATE_METRICS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Distribution of composite scores of selected candidates.
pub static COMPOSITE_SCORE: OnceLock<Histogram> = OnceLock::new();

/// Wall-clock duration of one selection call in seconds.
pub static RUN_DURATION: OnceLock<Histogram> = OnceLock::new();

/// Initialize all metrics and register them with the registry.
///
/// Call once at startup. Later calls build a fresh registry but leave the
/// statics set by the first call in place.
///
/// # Errors
///
/// Returns a `prometheus::Error` if metric registration fails.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let registry = Registry::new();

    let runs_total = CounterVec::new(
        Opts::new("select_forge_runs_total", "Total number of selection runs"),
        &["outcome"],
    )?;

    let candidates_total = CounterVec::new(
        Opts::new(
            "select_forge_candidates_total",
            "Candidates seen per pipeline stage",
        ),
        &["stage"],
    )?;

    let filter_fallbacks_total = Counter::new(
        "select_forge_filter_fallbacks_total",
        "Runs where no candidate passed the hard constraints",
    )?;

    let degenerate_metrics_total = CounterVec::new(
        Opts::new(
            "select_forge_degenerate_metrics_total",
            "Metrics with a constant value across the pool",
        ),
        &["metric"],
    )?;

    let composite_score = Histogram::with_opts(
        HistogramOpts::new(
            "select_forge_composite_score",
            "Composite scores of selected candidates",
        )
        .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]),
    )?;

    let run_duration = Histogram::with_opts(
        HistogramOpts::new(
            "select_forge_run_duration_seconds",
            "Selection run duration in seconds",
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
    )?;

    registry.register(Box::new(runs_total.clone()))?;
    registry.register(Box::new(candidates_total.clone()))?;
    registry.register(Box::new(filter_fallbacks_total.clone()))?;
    registry.register(Box::new(degenerate_metrics_total.clone()))?;
    registry.register(Box::new(composite_score.clone()))?;
    registry.register(Box::new(run_duration.clone()))?;

    // Already-set statics mean a previous call won; keep those.
    let _ = REGISTRY.set(registry);
    let _ = RUNS_TOTAL.set(runs_total);
    let _ = CANDIDATES_TOTAL.set(candidates_total);
    let _ = FILTER_FALLBACKS_TOTAL.set(filter_fallbacks_total);
    let _ = DEGENERATE_METRICS_TOTAL.set(degenerate_metrics_total);
    let _ = COMPOSITE_SCORE.set(composite_score);
    let _ = RUN_DURATION.set(run_duration);

    tracing::debug!("Prometheus metrics initialized");

    Ok(())
}

/// Export all registered metrics in Prometheus text format.
///
/// Returns a comment line instead of failing when the registry is not
/// initialized or encoding fails.
pub fn export_metrics() -> String {
    let Some(registry) = REGISTRY.get() else {
        return "# Metrics not initialized. Call init_metrics() first.\n".to_string();
    };

    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# Error encoding metrics: {}\n", e);
    }

    String::from_utf8(buffer)
        .unwrap_or_else(|e| format!("# Error converting metrics to UTF-8: {}\n", e))
}
