//! Seedable random stream shared by every stochastic operation.

use rand::prelude::*;

use crate::schema::Rule;

use super::evolution::random_rule;
use super::{Grid, GridError, Palette, random_palette};

/// Random number generator wrapper for grid, rule and palette generation.
///
/// Implements `RngCore`, so `&mut LifeRng` can be passed to any function
/// taking `&mut impl Rng`.
#[derive(Debug, Clone)]
pub struct LifeRng {
    rng: StdRng,
}

impl LifeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }

    /// Independent child stream seeded from this one.
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_seed())
    }

    /// Generate a random rule.
    pub fn random_rule(&mut self) -> Rule {
        random_rule(&mut self.rng)
    }

    /// Generate a random palette.
    pub fn random_palette(&mut self) -> Palette {
        random_palette(&mut self.rng)
    }

    /// Generate a random grid.
    pub fn random_grid(
        &mut self,
        width: usize,
        height: usize,
        fill_ratio: f64,
    ) -> Result<Grid, GridError> {
        Grid::random(width, height, fill_ratio, &mut self.rng)
    }
}

impl RngCore for LifeRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
