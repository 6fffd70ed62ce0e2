use rand::{RngCore, SeedableRng, rngs::StdRng};

use crate::domain::ports::Random;

/// Host random source over [`StdRng`].
pub struct HostRandom {
    rng: StdRng,
}

impl HostRandom {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for HostRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl Random for HostRandom {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }
}
