//! Similarity, novelty and diversity analysis for candidate selection.
//!
//! The selection pipeline treats these as external collaborators: it needs
//! a deterministic, symmetric similarity between embeddings and a bounded
//! novelty score relative to what has already been selected.
//!
//! # Overview
//!
//! 1. **Similarity** - cosine similarity (default) and Euclidean distance
//! 2. **Reference** - a decayed centroid of earlier selections, used for novelty
//! 3. **Metrics** - how spread out a selection is in embedding space
//!
//! # Usage
//!
//! ```rust,ignore
//! use select_forge::diversity::{ReferenceBuffer, SelectionDiversity};
//!
//! let mut history = ReferenceBuffer::new(128);
//! history.record(outcome.selected.iter().map(|s| s.scored.embedding()));
//! let reference = history.stats(config.time_decay);
//!
//! let metrics = SelectionDiversity::calculate(outcome.candidates());
//! println!("Max pairwise similarity: {:.3}", metrics.max_pairwise_similarity);
//! ```

pub mod metrics;
pub mod reference;
pub mod similarity;

pub use metrics::SelectionDiversity;
pub use reference::{CentroidNovelty, NoveltyEstimator, ReferenceBuffer, ReferenceStats};
pub use similarity::{
    cosine_similarity, euclidean_distance, pairwise_cosine_similarity, pairwise_euclidean_distance,
    CosineSimilarity, Similarity,
};
