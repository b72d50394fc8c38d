//! Seeded synthetic candidate pools for trying the pipeline out.

use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::candidate::{Candidate, RawMetrics};

/// Every n-th candidate (starting with the first) is flagged as an exception.
const EXCEPTION_EVERY: usize = 7;

/// Generates `count` candidates with uniform random metrics in [0, 1) and
/// `dimension`-sized embeddings. The same seed always yields the same pool.
pub fn generate_demo_pool(count: usize, dimension: usize, seed: u64) -> Vec<Candidate> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let embedding: Vec<f64> = (0..dimension).map(|_| rng.random_range(0.0..1.0)).collect();
            let metrics = RawMetrics {
                meaning_density: rng.random_range(0.0..1.0),
                resonance: rng.random_range(0.0..1.0),
                aesthetic_alignment: rng.random_range(0.0..1.0),
                distance: rng.random_range(0.0..1.0),
                recombinability: rng.random_range(0.0..1.0),
                binding: rng.random_range(0.0..1.0),
                description_length: rng.random_range(0.0..1.0),
                phase_difference: rng.random_range(0.0..1.0),
            };

            Candidate::new(format!("gen_{}", i), metrics, embedding)
                .with_exception(i % EXCEPTION_EVERY == 0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_pool_shape() {
        let pool = generate_demo_pool(15, 8, 42);

        assert_eq!(pool.len(), 15);
        assert!(pool.iter().all(|c| c.embedding.len() == 8));
        let exceptions: Vec<&str> = pool
            .iter()
            .filter(|c| c.is_exception)
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(exceptions, vec!["gen_0", "gen_7", "gen_14"]);
        assert!(pool.iter().all(|c| c.metrics.first_non_finite().is_none()));
    }

    #[test]
    fn test_demo_pool_is_seeded() {
        assert_eq!(generate_demo_pool(5, 4, 7), generate_demo_pool(5, 4, 7));
        assert_ne!(generate_demo_pool(5, 4, 7), generate_demo_pool(5, 4, 8));
    }
}
