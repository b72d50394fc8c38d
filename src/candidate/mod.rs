//! Candidate data model.
//!
//! Raw candidates are immutable inputs supplied by the caller. The pipeline
//! never mutates them; derived values are carried in [`ScoredCandidate`]
//! records that only live as long as a single selection call.

mod types;

pub use types::{Candidate, Metric, NormalizedMetrics, RawMetrics, ScoredCandidate};
