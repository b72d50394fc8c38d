//! Selection entry point chaining the six stages.
//!
//! ```text
//! candidates -> normalize -> boost -> filter -> score -> MMR select -> audit
//! ```
//!
//! Each stage consumes the output of the previous one. The caller's
//! candidates are borrowed and never modified.

use std::collections::HashSet;
use std::time::Instant;

use crate::candidate::Candidate;
use crate::diversity::{CentroidNovelty, CosineSimilarity, NoveltyEstimator, ReferenceStats, Similarity};
use crate::error::SelectionError;
use crate::metrics::MetricsCollector;

use super::audit::AuditLogger;
use super::boost::ExceptionBooster;
use super::config::SelectionConfig;
use super::filter::ConstraintFilter;
use super::mmr::DiversitySelector;
use super::normalize::MetricNormalizer;
use super::scoring::CompositeScorer;
use super::types::{SelectionOutcome, SelectionWarning};

/// Runs a selection with the default collaborators (centroid novelty,
/// cosine similarity).
///
/// # Errors
///
/// Returns `SelectionError` when the configuration is invalid or the pool
/// contains duplicate ids, non-finite metrics or inconsistent embeddings.
pub fn select<'a>(
    candidates: &'a [Candidate],
    config: &SelectionConfig,
    reference: &ReferenceStats,
) -> Result<SelectionOutcome<'a>, SelectionError> {
    Selector::new(config.clone())?.select(candidates, reference)
}

/// A configured selection pipeline.
///
/// The configuration is validated once on construction; a `Selector` can be
/// reused for any number of pools.
#[derive(Debug, Clone)]
pub struct Selector<S = CosineSimilarity, N = CentroidNovelty> {
    config: SelectionConfig,
    normalizer: MetricNormalizer,
    booster: ExceptionBooster<N>,
    filter: ConstraintFilter,
    scorer: CompositeScorer,
    diversity: DiversitySelector<S>,
    auditor: AuditLogger,
    metrics: MetricsCollector,
}

impl Selector<CosineSimilarity, CentroidNovelty> {
    /// Creates a selector from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::Configuration` if validation fails.
    pub fn new(config: SelectionConfig) -> Result<Self, SelectionError> {
        config.validate()?;

        Ok(Self {
            normalizer: MetricNormalizer::default(),
            booster: ExceptionBooster::new(config.exception_boost),
            filter: ConstraintFilter::new(config.constraints),
            scorer: CompositeScorer::new(config.weights.clone()),
            diversity: DiversitySelector::new(config.diversity_alpha, config.k),
            auditor: AuditLogger::new(),
            metrics: MetricsCollector::new(),
            config,
        })
    }
}

impl<S: Similarity, N: NoveltyEstimator> Selector<S, N> {
    /// Replaces the similarity function used by the diversity stage.
    pub fn with_similarity<S2: Similarity>(self, similarity: S2) -> Selector<S2, N> {
        Selector {
            diversity: DiversitySelector::with_similarity(
                self.config.diversity_alpha,
                self.config.k,
                similarity,
            ),
            config: self.config,
            normalizer: self.normalizer,
            booster: self.booster,
            filter: self.filter,
            scorer: self.scorer,
            auditor: self.auditor,
            metrics: self.metrics,
        }
    }

    /// Replaces the novelty estimator used by the boost stage.
    pub fn with_novelty<N2: NoveltyEstimator>(self, estimator: N2) -> Selector<S, N2> {
        Selector {
            booster: ExceptionBooster::with_estimator(self.config.exception_boost, estimator),
            config: self.config,
            normalizer: self.normalizer,
            filter: self.filter,
            scorer: self.scorer,
            diversity: self.diversity,
            auditor: self.auditor,
            metrics: self.metrics,
        }
    }

    /// The validated configuration.
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Selects up to `k` diverse, high-scoring candidates from the pool.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError` if the pool fails validation. Nothing is
    /// selected in that case.
    pub fn select<'a>(
        &self,
        candidates: &'a [Candidate],
        reference: &ReferenceStats,
    ) -> Result<SelectionOutcome<'a>, SelectionError> {
        let start_time = Instant::now();

        if let Err(e) = validate_pool(candidates, reference) {
            tracing::warn!(error = %e, "Rejected candidate pool");
            self.metrics
                .record_run("error", start_time.elapsed().as_secs_f64());
            return Err(e);
        }

        if candidates.is_empty() {
            tracing::debug!("Empty candidate pool, nothing to select");
            let outcome = SelectionOutcome::empty();
            self.metrics
                .record_selection(&outcome, start_time.elapsed().as_secs_f64());
            return Ok(outcome);
        }

        let normalization = self.normalizer.normalize(candidates);
        let mut warnings = normalization.warnings;
        let mut scored = normalization.scored;

        self.booster.apply(&mut scored, reference);

        let filtered = self.filter.apply(scored);
        if filtered.fallback_triggered {
            warnings.push(SelectionWarning::EmptyPool {
                pool_size: candidates.len(),
            });
        }

        let mut pool = filtered.pool;
        self.scorer.apply(&mut pool);
        let filtered_size = pool.len();

        let selected = self.diversity.select(pool);
        let audit = self.auditor.generate(&selected);

        let outcome = SelectionOutcome {
            selected,
            audit,
            warnings,
            pool_size: candidates.len(),
            filtered_size,
            fallback_triggered: filtered.fallback_triggered,
        };

        let duration = start_time.elapsed();
        self.metrics
            .record_selection(&outcome, duration.as_secs_f64());

        tracing::info!(
            pool_size = outcome.pool_size,
            filtered_size = outcome.filtered_size,
            selected = outcome.selected.len(),
            fallback = outcome.fallback_triggered,
            warnings = outcome.warnings.len(),
            duration_ms = duration.as_millis() as u64,
            "Selection complete"
        );

        Ok(outcome)
    }
}

/// Checks the pool before any stage runs.
fn validate_pool(candidates: &[Candidate], reference: &ReferenceStats) -> Result<(), SelectionError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
    let mut dimension: Option<usize> = None;

    for candidate in candidates {
        if !seen.insert(candidate.id.as_str()) {
            return Err(SelectionError::DuplicateCandidate(candidate.id.clone()));
        }

        if let Some(metric) = candidate.metrics.first_non_finite() {
            return Err(SelectionError::InvalidCandidate {
                id: candidate.id.clone(),
                reason: format!("{} is not finite", metric),
            });
        }

        if candidate.embedding.is_empty() {
            return Err(SelectionError::InvalidCandidate {
                id: candidate.id.clone(),
                reason: "embedding is empty".to_string(),
            });
        }

        if candidate.embedding.iter().any(|v| !v.is_finite()) {
            return Err(SelectionError::InvalidCandidate {
                id: candidate.id.clone(),
                reason: "embedding contains a non-finite value".to_string(),
            });
        }

        match dimension {
            None => dimension = Some(candidate.embedding.len()),
            Some(expected) if expected != candidate.embedding.len() => {
                return Err(SelectionError::EmbeddingDimensionMismatch {
                    id: candidate.id.clone(),
                    expected,
                    actual: candidate.embedding.len(),
                });
            }
            Some(_) => {}
        }
    }

    if let (Some(expected), Some(centroid)) = (dimension, reference.centroid()) {
        if centroid.len() != expected {
            return Err(SelectionError::EmbeddingDimensionMismatch {
                id: "reference".to_string(),
                expected,
                actual: centroid.len(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::RawMetrics;

    fn metrics(rho: f64, quality: f64) -> RawMetrics {
        RawMetrics {
            meaning_density: rho,
            resonance: quality,
            aesthetic_alignment: quality,
            distance: 1.0 - quality,
            recombinability: rho,
            binding: quality,
            description_length: 0.5,
            phase_difference: 0.0,
        }
    }

    fn pool() -> Vec<Candidate> {
        vec![
            Candidate::new("a", metrics(0.9, 0.9), vec![1.0, 0.0, 0.0]),
            Candidate::new("b", metrics(0.8, 0.8), vec![0.99, 0.01, 0.0]),
            Candidate::new("c", metrics(0.5, 0.7), vec![0.0, 1.0, 0.0]),
            Candidate::new("d", metrics(0.3, 0.6), vec![0.0, 0.0, 1.0]),
            Candidate::new("e", metrics(0.1, 0.1), vec![0.5, 0.5, 0.0]),
        ]
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SelectionConfig::default().with_k(0);
        let err = Selector::new(config).unwrap_err();
        assert!(matches!(err, SelectionError::Configuration(_)));
    }

    #[test]
    fn test_empty_pool() {
        let outcome = select(&[], &SelectionConfig::default(), &ReferenceStats::empty())
            .expect("empty pool is valid");
        assert!(outcome.selected.is_empty());
        assert!(outcome.audit.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut candidates = pool();
        candidates[3].id = "a".to_string();

        let err = select(&candidates, &SelectionConfig::default(), &ReferenceStats::empty())
            .unwrap_err();
        assert!(matches!(err, SelectionError::DuplicateCandidate(id) if id == "a"));
    }

    #[test]
    fn test_non_finite_metric_rejected() {
        let mut candidates = pool();
        candidates[1].metrics.resonance = f64::INFINITY;

        let err = select(&candidates, &SelectionConfig::default(), &ReferenceStats::empty())
            .unwrap_err();
        match err {
            SelectionError::InvalidCandidate { id, reason } => {
                assert_eq!(id, "b");
                assert!(reason.contains("resonance"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut candidates = pool();
        candidates[2].embedding = vec![1.0, 0.0];

        let err = select(&candidates, &SelectionConfig::default(), &ReferenceStats::empty())
            .unwrap_err();
        assert!(matches!(
            err,
            SelectionError::EmbeddingDimensionMismatch { ref id, expected: 3, actual: 2 } if id == "c"
        ));
    }

    #[test]
    fn test_reference_dimension_checked() {
        let candidates = pool();
        let reference = ReferenceStats::with_centroid(vec![1.0, 0.0]);

        let err = select(&candidates, &SelectionConfig::default(), &reference).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::EmbeddingDimensionMismatch { ref id, .. } if id == "reference"
        ));
    }

    #[test]
    fn test_empty_embedding_rejected() {
        let mut candidates = pool();
        candidates[0].embedding.clear();

        let err = select(&candidates, &SelectionConfig::default(), &ReferenceStats::empty())
            .unwrap_err();
        assert!(matches!(err, SelectionError::InvalidCandidate { .. }));
    }

    #[test]
    fn test_select_basic_flow() {
        let candidates = pool();
        let config = SelectionConfig::default().with_k(3);

        let outcome = select(&candidates, &config, &ReferenceStats::empty()).expect("selection");

        assert_eq!(outcome.selected.len(), 3);
        assert_eq!(outcome.audit.len(), 3);
        assert_eq!(outcome.pool_size, 5);
        assert_eq!(outcome.selected[0].id(), "a");
        for (selected, record) in outcome.selected.iter().zip(&outcome.audit) {
            assert_eq!(selected.id(), record.id);
            assert_eq!(selected.rank, record.rank);
        }
        // "b" is almost a copy of "a"; the diverse "c" should beat it.
        assert_eq!(outcome.selected[1].id(), "c");
    }

    #[test]
    fn test_candidates_unchanged() {
        let candidates = pool();
        let before = candidates.clone();

        let _ = select(&candidates, &SelectionConfig::default(), &ReferenceStats::empty())
            .expect("selection");

        assert_eq!(candidates, before);
    }

    #[test]
    fn test_custom_collaborators() {
        let candidates = pool();
        let selector = Selector::new(SelectionConfig::default().with_k(5))
            .expect("valid config")
            .with_similarity(|_: &[f64], _: &[f64]| 0.0)
            .with_novelty(|_: &[f64], _: &ReferenceStats| 0.5);

        let outcome = selector
            .select(&candidates, &ReferenceStats::empty())
            .expect("selection");

        // Without a similarity penalty the order is the composite order.
        let composites: Vec<f64> = outcome.selected.iter().map(|s| s.scored.composite).collect();
        assert!(composites.windows(2).all(|w| w[0] >= w[1]));
        assert!(outcome.selected.iter().all(|s| s.scored.novelty == 0.5));
    }

    #[test]
    fn test_selector_reusable() {
        let candidates = pool();
        let selector = Selector::new(SelectionConfig::default()).expect("valid config");

        let first = selector.select(&candidates, &ReferenceStats::empty()).expect("first");
        let second = selector.select(&candidates, &ReferenceStats::empty()).expect("second");

        assert_eq!(first.ids(), second.ids());
        assert_eq!(first.audit, second.audit);
    }
}
