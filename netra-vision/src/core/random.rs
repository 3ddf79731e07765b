//! Seedable random source for the pipeline's explicitly randomized choices.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Random source with configurable seed for reproducibility.
///
/// If seed is 0, uses random entropy for non-deterministic behavior.
/// Otherwise, uses the provided seed for reproducible results.
///
/// Both the navigation-signal tie-break and the controller's recovery
/// choices draw from this source, so a seeded run replays identically.
#[derive(Clone, Debug)]
pub struct RandomSource {
    rng: SmallRng,
}

impl RandomSource {
    /// Create a new random source.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Fair coin flip.
    #[inline]
    pub fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}
