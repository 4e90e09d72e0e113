//! Aesthetic fitness of a rule.
//!
//! A rule is scored by running it from a random grid: a burn-in phase whose
//! result is the *base* grid, then a short measured phase ending in the
//! *final* grid. The score rewards moderate change between the two, moderate
//! density, intermediate ages, some births and a spread of ages.

use rand::Rng;

use crate::compute::{Grid, run};
use crate::schema::{EvaluationConfig, Rule, SearchConfigError};

/// Target normalised average age.
const TARGET_AGE: f64 = 0.3;
/// Target live-cell density.
const TARGET_DENSITY: f64 = 0.2;
/// Target normalised changed-cell density.
const TARGET_CHANGE: f64 = 0.1;

const BIRTHS_WEIGHT: f64 = -0.3;
const AGE_DEVIATION_WEIGHT: f64 = 0.5;
const AGE_WEIGHT: f64 = 0.7;
const DENSITY_WEIGHT: f64 = 0.8;
const CHANGE_WEIGHT: f64 = 1.3;

/// How close `value` is to `target`, for `0 < target < 1`.
///
/// Peaks at exactly 1.0 when `value == target` and falls off quadratically,
/// scaled so that 0 and 1 both map to 0. Values outside `[0, 1]` go negative.
#[inline]
pub fn goodness(target: f64, value: f64) -> f64 {
    if value < target {
        let d = (target - value) / target;
        1.0 - d * d
    } else {
        let d = (value - target) / (1.0 - target);
        1.0 - d * d
    }
}

/// `weight * ln(x)`, or negative infinity when `x` is not positive.
///
/// A non-positive argument marks the rule as unusable regardless of the sign
/// of `weight`, so the term never contributes `+inf` or NaN.
#[inline]
pub fn log_term(weight: f64, x: f64) -> f64 {
    if x > 0.0 {
        weight * x.ln()
    } else {
        f64::NEG_INFINITY
    }
}

/// Statistics comparing the base and final grids.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryMetrics {
    /// Cells whose aliveness differs between base and final.
    pub changed: usize,
    /// Live fraction of the final grid.
    pub density: f64,
    /// Mean age of live cells in the final grid.
    pub average_age: f64,
    /// Population variance of live-cell ages in the final grid.
    pub age_deviation: f64,
    /// `min(1, 2 * changed / cells)`.
    pub normalized_changed_density: f64,
}

impl TrajectoryMetrics {
    /// Measure the final grid against the base grid. `None` if `last` is extinct.
    pub fn measure(base: &Grid, last: &Grid) -> Option<Self> {
        let ages: Vec<f64> = last
            .cells()
            .iter()
            .filter_map(|c| c.age())
            .map(|a| a as f64)
            .collect();
        if ages.is_empty() {
            return None;
        }

        let cells = last.size() as f64;
        let live = ages.len() as f64;
        let average_age = ages.iter().sum::<f64>() / live;
        let age_deviation = ages
            .iter()
            .map(|&a| (a - average_age).powi(2))
            .sum::<f64>()
            / live;
        let changed = base.aliveness_changes(last);

        Some(Self {
            changed,
            density: live / cells,
            average_age,
            age_deviation,
            normalized_changed_density: (2.0 * changed as f64 / cells).min(1.0),
        })
    }

    /// Combined score given total births and the age normalisation range.
    pub fn score(&self, births: u64, age_range: usize) -> f64 {
        let normalized_age = self.average_age / age_range as f64;
        log_term(BIRTHS_WEIGHT, births as f64)
            + log_term(AGE_DEVIATION_WEIGHT, self.age_deviation)
            + log_term(AGE_WEIGHT, goodness(TARGET_AGE, normalized_age))
            + log_term(DENSITY_WEIGHT, goodness(TARGET_DENSITY, self.density))
            + log_term(
                CHANGE_WEIGHT,
                goodness(TARGET_CHANGE, self.normalized_changed_density),
            )
    }
}

/// Result of evaluating one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessReport {
    /// Combined score; negative infinity for rejected rules.
    pub score: f64,
    /// Births over burn-in and measurement.
    pub births: u64,
    /// Live cells in the final grid.
    pub live_count: usize,
    /// Trajectory statistics, absent when the final grid is extinct.
    pub metrics: Option<TrajectoryMetrics>,
}

impl FitnessReport {
    #[inline]
    pub fn is_extinct(&self) -> bool {
        self.live_count == 0
    }
}

/// Runs the fitness protocol.
#[derive(Debug, Clone, Default)]
pub struct FitnessEvaluator {
    config: EvaluationConfig,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(config: EvaluationConfig) -> Result<Self, SearchConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Score `rule` from a random starting grid drawn from `rng`.
    pub fn evaluate<R: Rng + ?Sized>(&self, rule: &Rule, rng: &mut R) -> FitnessReport {
        let initial = Grid::random_unchecked(
            self.config.width,
            self.config.height,
            self.config.fill_ratio,
            rng,
        );
        self.evaluate_grid(rule, &initial)
    }

    /// Score `rule` starting from `initial`.
    pub fn evaluate_grid(&self, rule: &Rule, initial: &Grid) -> FitnessReport {
        let base = run(initial, rule, self.config.burn_in_steps);
        let last = run(&base.grid, rule, self.config.measure_steps);
        let births = base.births + last.births;

        let metrics = TrajectoryMetrics::measure(&base.grid, &last.grid);
        let score = match &metrics {
            Some(m) => m.score(births, self.config.age_range),
            None => f64::NEG_INFINITY,
        };

        FitnessReport {
            score,
            births,
            live_count: last.live_count,
            metrics,
        }
    }
}

/// Score `rule` with the reference protocol.
pub fn fitness<R: Rng + ?Sized>(rule: &Rule, rng: &mut R) -> f64 {
    FitnessEvaluator::default().evaluate(rule, rng).score
}
