//! Random rule generation.
//!
//! Weights share a random base with per-weight jitter, then a geometric
//! number of single-weight perturbations. Thresholds are drawn so that
//! `life_min <= birth_min <= life_max` and `birth_min >= 1`.

use rand::Rng;

use crate::schema::{NEIGHBOR_COUNT, Rule};

/// Range of the shared base weight.
const BASE_WEIGHT: std::ops::Range<i32> = -10..20;
/// Range of the jitter bound.
const WEIGHT_SPREAD: std::ops::Range<i32> = 0..20;
/// Probability of each further perturbation.
const PERTURB_PROBABILITY: f64 = 0.4;
/// Range of a single perturbation.
const PERTURBATION: std::ops::Range<i32> = -20..20;
/// Range of each threshold increment.
const THRESHOLD_STEP: std::ops::Range<i32> = 0..30;

/// Generate a random rule.
pub fn random_rule<R: Rng + ?Sized>(rng: &mut R) -> Rule {
    let base = rng.gen_range(BASE_WEIGHT);
    let spread = rng.gen_range(WEIGHT_SPREAD);

    let mut weights = [0i32; NEIGHBOR_COUNT];
    for w in &mut weights {
        // An empty jitter range contributes nothing
        *w = base + if spread > 0 { rng.gen_range(0..spread) } else { 0 };
    }

    perturb(&mut weights, rng);

    let life_min = rng.gen_range(THRESHOLD_STEP);
    let birth_min = life_min.max(1) + rng.gen_range(THRESHOLD_STEP);
    let life_max = birth_min + rng.gen_range(THRESHOLD_STEP);

    Rule {
        weights,
        life_min,
        birth_min,
        life_max,
    }
}

/// Repeatedly nudge a random weight while a 0.4 coin keeps landing heads.
fn perturb<R: Rng + ?Sized>(weights: &mut [i32; NEIGHBOR_COUNT], rng: &mut R) -> usize {
    let mut count = 0;
    while rng.gen_bool(PERTURB_PROBABILITY) {
        let idx = rng.gen_range(0..NEIGHBOR_COUNT);
        weights[idx] += rng.gen_range(PERTURBATION);
        count += 1;
    }
    count
}
