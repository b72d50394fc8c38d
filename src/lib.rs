//! select_forge: diversity-aware selection of scored candidates.
//!
//! Takes a pool of candidates carrying raw metrics and an embedding, and
//! returns a small, diverse, high-scoring subset together with an audit
//! trail explaining every pick.

pub mod candidate;
pub mod cli;
pub mod diversity;
pub mod error;
pub mod export;
pub mod metrics;
pub mod selection;

pub use candidate::{Candidate, Metric, RawMetrics};
pub use diversity::{ReferenceBuffer, ReferenceStats};
pub use error::{ConfigError, ExportError, SelectionError};
pub use selection::{
    select, AuditRecord, Preset, SelectedCandidate, SelectionConfig, SelectionOutcome,
    SelectionWarning, Selector,
};
