//! Seed management for reproducible generation and runs.

use std::hash::Hasher;

use fnv::FnvHasher;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Reproducible seed for generation and start choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    /// Base seed value
    pub seed: u64,
}

impl Seed {
    /// Create a seed from a literal value
    #[must_use]
    pub const fn from_literal(seed: u64) -> Self {
        Self { seed }
    }

    /// Create a seed by hashing a string
    #[must_use]
    pub fn from_string(s: &str) -> Self {
        let mut hasher = FnvHasher::default();
        hasher.write(s.as_bytes());
        Self {
            seed: hasher.finish(),
        }
    }

    /// Derive a seed for a specific context
    ///
    /// Same base seed and context always derive the same seed;
    /// different contexts derive different streams.
    #[must_use]
    pub fn derive(&self, context: &str) -> Self {
        let mut hasher = FnvHasher::default();
        hasher.write_u64(self.seed);
        hasher.write(context.as_bytes());
        Self {
            seed: hasher.finish(),
        }
    }

    /// Create an RNG from this seed
    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::from_literal(42)
    }
}
