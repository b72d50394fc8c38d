//! Property tests for normalization and selection invariants.

use std::collections::HashSet;

use proptest::prelude::*;
use select_forge::candidate::{Candidate, RawMetrics};
use select_forge::diversity::ReferenceStats;
use select_forge::selection::{select, MetricNormalizer, SelectionConfig};

fn raw_metrics() -> impl Strategy<Value = RawMetrics> {
    prop::array::uniform8(-1000.0f64..1000.0).prop_map(|v| RawMetrics {
        meaning_density: v[0],
        resonance: v[1],
        aesthetic_alignment: v[2],
        distance: v[3],
        recombinability: v[4],
        binding: v[5],
        description_length: v[6],
        phase_difference: v[7],
    })
}

fn pool(max: usize) -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec(
        (
            raw_metrics(),
            prop::collection::vec(-1.0f64..1.0, 3),
            any::<bool>(),
        ),
        1..max,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (metrics, embedding, is_exception))| {
                Candidate::new(format!("c{:03}", i), metrics, embedding)
                    .with_exception(is_exception)
            })
            .collect()
    })
}

proptest! {
    /// Every min-max normalized value and inverted score lies in [0, 1].
    #[test]
    fn normalized_metrics_are_bounded(candidates in pool(30)) {
        let normalization = MetricNormalizer::default().normalize(&candidates);
        prop_assert_eq!(normalization.scored.len(), candidates.len());

        for scored in &normalization.scored {
            let n = &scored.normalized;
            for value in [
                n.meaning_density,
                n.resonance,
                n.aesthetic_alignment,
                n.distance,
                n.reachability,
                n.recombinability,
                n.binding,
                n.description_length,
                n.simplicity,
            ] {
                prop_assert!((0.0..=1.0).contains(&value), "out of range: {}", value);
            }
            prop_assert!(n.phase_difference >= 0.0);
        }
    }

    /// Selection size is min(k, filtered pool) with no duplicates.
    #[test]
    fn selection_size_and_uniqueness(
        candidates in pool(25),
        k in 1usize..12,
        alpha in 0.0f64..=1.0,
    ) {
        let config = SelectionConfig::default().with_k(k).with_diversity_alpha(alpha);
        let outcome = select(&candidates, &config, &ReferenceStats::empty()).unwrap();

        prop_assert!(outcome.filtered_size >= 1);
        prop_assert!(outcome.filtered_size <= candidates.len());
        prop_assert_eq!(outcome.selected.len(), k.min(outcome.filtered_size));
        prop_assert_eq!(outcome.audit.len(), outcome.selected.len());

        let ids: HashSet<&str> = outcome.ids().into_iter().collect();
        prop_assert_eq!(ids.len(), outcome.selected.len());

        let top = outcome.selected[0].scored.composite;
        prop_assert!(outcome.selected.iter().all(|s| s.scored.composite <= top));
    }

    /// Identical inputs give identical selections and audits.
    #[test]
    fn selection_is_deterministic(candidates in pool(20), k in 1usize..8) {
        let config = SelectionConfig::default().with_k(k);
        let reference = ReferenceStats::with_centroid(vec![0.3, -0.2, 0.9]);

        let first = select(&candidates, &config, &reference).unwrap();
        let second = select(&candidates, &config, &reference).unwrap();

        prop_assert_eq!(first.ids(), second.ids());
        prop_assert_eq!(first.audit, second.audit);
    }

    /// Boosted values never leave [0, 1].
    #[test]
    fn boosted_values_stay_bounded(candidates in pool(20)) {
        let config = SelectionConfig::default().with_k(candidates.len());
        let outcome = select(&candidates, &config, &ReferenceStats::empty()).unwrap();

        for selected in &outcome.selected {
            prop_assert!(selected.scored.novelty <= 1.0);
            prop_assert!(selected.scored.normalized.meaning_density <= 1.0);
        }
    }
}
