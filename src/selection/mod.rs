//! Candidate selection pipeline.
//!
//! Six stages run in a fixed order over a borrowed pool:
//!
//! 1. [`MetricNormalizer`]: min-max rescaling, inverted reachability and
//!    simplicity, absolute phase difference
//! 2. [`ExceptionBooster`]: novelty against the reference, boost for outliers
//! 3. [`ConstraintFilter`]: hard thresholds with an empty-pool fallback
//! 4. [`CompositeScorer`]: weighted sum of the normalized terms
//! 5. [`DiversitySelector`]: greedy MMR selection
//! 6. [`AuditLogger`]: a rationale per pick
//!
//! # Example
//!
//! ```ignore
//! use select_forge::selection::{select, SelectionConfig};
//! use select_forge::diversity::ReferenceStats;
//!
//! let outcome = select(&candidates, &SelectionConfig::default(), &ReferenceStats::empty())?;
//! for record in &outcome.audit {
//!     println!("{} {:.4} {}", record.rank, record.composite, record.rationale);
//! }
//! ```

pub mod audit;
pub mod boost;
pub mod config;
pub mod filter;
pub mod mmr;
pub mod normalize;
pub mod pipeline;
pub mod scoring;
pub mod types;

pub use audit::{round_to, AuditLogger, AuditRecord, EXCEPTION_MARKER};
pub use boost::ExceptionBooster;
pub use config::{
    ConfigError, HardConstraints, MetricWeights, Preset, ScoreTerm, SelectionConfig,
};
pub use filter::{ConstraintFilter, FilterOutcome};
pub use mmr::{DiversitySelector, NON_FINITE_SIMILARITY};
pub use normalize::{MetricNormalizer, MetricRange, Normalization};
pub use pipeline::{select, Selector};
pub use scoring::CompositeScorer;
pub use types::{SelectedCandidate, SelectionOutcome, SelectionWarning};
