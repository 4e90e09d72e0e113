//! Weighted-neighbour transition rule.

use serde::{Deserialize, Serialize};

/// Number of neighbours in the Moore neighbourhood, and so of rule weights.
pub const NEIGHBOR_COUNT: usize = 8;

/// A weighted-neighbour rule.
///
/// Each live neighbour contributes its weight to the cell's life value
/// (see [`crate::compute::NEIGHBOR_OFFSETS`] for the weight order). A dead cell
/// is born when `birth_min <= value <= life_max`; a live cell survives when
/// `life_min <= value <= life_max`.
///
/// The type does not enforce any ordering between the thresholds. Degenerate
/// orderings are legal and simply make birth or survival impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Neighbour weights, indexed like `NEIGHBOR_OFFSETS`.
    pub weights: [i32; NEIGHBOR_COUNT],
    /// Lowest life value at which a live cell survives.
    pub life_min: i32,
    /// Lowest life value at which a dead cell is born.
    pub birth_min: i32,
    /// Highest life value at which a cell is born or survives.
    pub life_max: i32,
}

impl Rule {
    /// Classic Game of Life (B3/S23) expressed as a weighted rule.
    pub const CONWAY: Rule = Rule {
        weights: [1; NEIGHBOR_COUNT],
        life_min: 2,
        birth_min: 3,
        life_max: 3,
    };

    /// Create a rule from weights and thresholds.
    pub const fn new(
        weights: [i32; NEIGHBOR_COUNT],
        life_min: i32,
        birth_min: i32,
        life_max: i32,
    ) -> Self {
        Self {
            weights,
            life_min,
            birth_min,
            life_max,
        }
    }

    /// Whether a dead cell with this life value is born.
    #[inline]
    pub fn is_birth(&self, life_value: i32) -> bool {
        self.birth_min <= life_value && life_value <= self.life_max
    }

    /// Whether a live cell with this life value survives.
    #[inline]
    pub fn is_survival(&self, life_value: i32) -> bool {
        self.life_min <= life_value && life_value <= self.life_max
    }

    /// Whether `life_min <= birth_min <= life_max`, the ordering every
    /// generated rule satisfies.
    pub fn has_ordered_thresholds(&self) -> bool {
        self.life_min <= self.birth_min && self.birth_min <= self.life_max
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::CONWAY
    }
}
