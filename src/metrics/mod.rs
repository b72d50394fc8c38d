//! Prometheus metrics for selection runs.
//!
//! # Example
//!
//! ```ignore
//! use select_forge::metrics::{init_metrics, export_metrics, MetricsCollector};
//!
//! init_metrics().expect("Failed to initialize metrics");
//!
//! let collector = MetricsCollector::new();
//! collector.record_run("success", 0.003);
//!
//! let metrics_text = export_metrics();
//! ```

pub mod collectors;
pub mod prometheus;

pub use collectors::MetricsCollector;
pub use prometheus::{export_metrics, init_metrics};

pub use prometheus::{
    CANDIDATES_TOTAL, COMPOSITE_SCORE, DEGENERATE_METRICS_TOTAL, FILTER_FALLBACKS_TOTAL, REGISTRY,
    RUNS_TOTAL, RUN_DURATION,
};
