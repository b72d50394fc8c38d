//! Reference statistics for novelty estimation.
//!
//! The "already seen" distribution is summarized by a centroid. A
//! [`ReferenceBuffer`] keeps the embeddings of earlier selections so that the
//! centroid can be recomputed after every run, weighting recent entries more
//! heavily.

use std::collections::VecDeque;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::similarity::cosine_similarity;

/// Default number of embeddings kept in a reference buffer.
const DEFAULT_CAPACITY: usize = 256;

/// Summary of the reference distribution consumed by novelty estimators.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceStats {
    /// Reference point in embedding space. `None` when nothing has been seen.
    #[serde(default)]
    pub centroid: Option<Vec<f64>>,

    /// Number of history entries the centroid was built from.
    #[serde(default)]
    pub observations: usize,
}

impl ReferenceStats {
    /// Statistics for an empty history.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Statistics with an explicit centroid.
    pub fn with_centroid(centroid: Vec<f64>) -> Self {
        Self {
            centroid: Some(centroid),
            observations: 1,
        }
    }

    /// The reference point, if any.
    pub fn centroid(&self) -> Option<&[f64]> {
        self.centroid.as_deref()
    }
}

/// Estimates how far an embedding lies from the reference distribution.
pub trait NoveltyEstimator {
    /// Returns a novelty score. Callers clamp the result to [0, 1].
    fn novelty(&self, embedding: &[f64], reference: &ReferenceStats) -> f64;
}

/// Novelty as cosine distance to the reference centroid.
///
/// Returns `1 - cos(embedding, centroid)` clamped to [0, 1]. Without a
/// centroid every embedding is fully novel.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidNovelty;

impl NoveltyEstimator for CentroidNovelty {
    fn novelty(&self, embedding: &[f64], reference: &ReferenceStats) -> f64 {
        match reference.centroid() {
            Some(centroid) => {
                let sim = cosine_similarity(ArrayView1::from(embedding), ArrayView1::from(centroid));
                (1.0 - sim).clamp(0.0, 1.0)
            }
            None => 1.0,
        }
    }
}

impl<F> NoveltyEstimator for F
where
    F: Fn(&[f64], &ReferenceStats) -> f64,
{
    fn novelty(&self, embedding: &[f64], reference: &ReferenceStats) -> f64 {
        self(embedding, reference)
    }
}

/// Bounded history of previously selected embeddings.
///
/// Deserialization rejects a zero capacity and entries that are empty,
/// non-finite or of differing dimensions. Entries beyond the capacity are
/// evicted oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredReferenceBuffer")]
pub struct ReferenceBuffer {
    capacity: usize,
    /// Oldest first.
    entries: VecDeque<Vec<f64>>,
}

/// On-disk shape of a [`ReferenceBuffer`] before validation.
#[derive(Deserialize)]
struct StoredReferenceBuffer {
    capacity: usize,
    #[serde(default)]
    entries: VecDeque<Vec<f64>>,
}

impl TryFrom<StoredReferenceBuffer> for ReferenceBuffer {
    type Error = String;

    fn try_from(stored: StoredReferenceBuffer) -> Result<Self, Self::Error> {
        if stored.capacity == 0 {
            return Err("reference buffer capacity must be at least 1".to_string());
        }

        let dimension = stored.entries.front().map(Vec::len);
        for (i, entry) in stored.entries.iter().enumerate() {
            if entry.is_empty() {
                return Err(format!("reference entry {} is empty", i));
            }
            if Some(entry.len()) != dimension {
                return Err(format!(
                    "reference entry {} has dimension {}, expected {}",
                    i,
                    entry.len(),
                    dimension.unwrap_or_default()
                ));
            }
            if entry.iter().any(|v| !v.is_finite()) {
                return Err(format!("reference entry {} contains a non-finite value", i));
            }
        }

        let mut entries = stored.entries;
        while entries.len() > stored.capacity {
            entries.pop_front();
        }

        Ok(Self {
            capacity: stored.capacity,
            entries,
        })
    }
}

impl Default for ReferenceBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ReferenceBuffer {
    /// Creates an empty buffer holding at most `capacity` embeddings.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Number of embeddings currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends embeddings as the newest history, evicting the oldest entries.
    ///
    /// Embeddings whose length differs from the existing history are skipped.
    /// Returns the number of embeddings recorded.
    pub fn record<'a, I>(&mut self, embeddings: I) -> usize
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let mut recorded = 0;
        for embedding in embeddings {
            if let Some(first) = self.entries.front() {
                if first.len() != embedding.len() {
                    tracing::warn!(
                        expected = first.len(),
                        actual = embedding.len(),
                        "Skipping reference embedding with mismatched dimension"
                    );
                    continue;
                }
            }
            if embedding.is_empty() {
                continue;
            }

            self.entries.push_back(embedding.to_vec());
            recorded += 1;

            while self.entries.len() > self.capacity {
                self.entries.pop_front();
            }
        }
        recorded
    }

    /// Computes a recency-decayed centroid.
    ///
    /// The newest entry has weight 1, the one before it `decay`, then
    /// `decay^2`, and so on.
    pub fn stats(&self, decay: f64) -> ReferenceStats {
        let Some(newest) = self.entries.back() else {
            return ReferenceStats::empty();
        };

        let mut centroid = Array1::<f64>::zeros(newest.len());
        let mut total_weight = 0.0;
        let mut weight = 1.0;

        for entry in self.entries.iter().rev() {
            centroid.scaled_add(weight, &ArrayView1::from(entry.as_slice()));
            total_weight += weight;
            weight *= decay;
        }

        if total_weight > 0.0 {
            centroid.mapv_inplace(|x| x / total_weight);
        }

        ReferenceStats {
            centroid: Some(centroid.to_vec()),
            observations: self.entries.len(),
        }
    }
}
