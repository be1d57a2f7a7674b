use crate::Generator;
use jiff::Timestamp;
use parking_lot::Mutex;
use pinhole_core::shortcode::ALPHABET;
use pinhole_core::ShortCode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws every character independently and uniformly from `[a-z0-9]`.
///
/// The RNG is seeded from the wall clock unless a seed is given, so two
/// generators created in the same nanosecond produce the same sequence.
pub struct RandomGenerator {
    rng: Mutex<StdRng>,
}

impl RandomGenerator {
    /// Creates a generator seeded from the current time.
    pub fn new() -> Self {
        // Only the low 64 bits of the nanosecond clock vary between runs.
        Self::with_seed(Timestamp::now().as_nanosecond() as u64)
    }

    /// Creates a generator with a fixed seed, producing a reproducible
    /// sequence of codes.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RandomGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomGenerator").finish_non_exhaustive()
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self, length: usize) -> Self::Output {
        let mut rng = self.rng.lock();
        let code: String = (0..length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}
