//! Rule search and fitness evaluation configuration.

use serde::{Deserialize, Serialize};

use super::Rule;

/// Settings for the fixed fitness protocol.
///
/// The defaults are the reference protocol: a 20x20 grid seeded at 30%,
/// 171 burn-in steps, 20 measured steps and 75 age buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Evaluation grid width in cells.
    #[serde(default = "default_eval_size")]
    pub width: usize,
    /// Evaluation grid height in cells.
    #[serde(default = "default_eval_size")]
    pub height: usize,
    /// Probability that a cell starts alive (0.0-1.0).
    #[serde(default = "default_eval_fill_ratio")]
    pub fill_ratio: f64,
    /// Steps run before the base grid is captured.
    #[serde(default = "default_burn_in_steps")]
    pub burn_in_steps: u64,
    /// Steps run from the base grid to the final grid.
    #[serde(default = "default_measure_steps")]
    pub measure_steps: u64,
    /// Age normalisation range, shared with the palette length.
    #[serde(default = "default_age_range")]
    pub age_range: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            width: default_eval_size(),
            height: default_eval_size(),
            fill_ratio: default_eval_fill_ratio(),
            burn_in_steps: default_burn_in_steps(),
            measure_steps: default_measure_steps(),
            age_range: default_age_range(),
        }
    }
}

fn default_eval_size() -> usize {
    20
}
fn default_eval_fill_ratio() -> f64 {
    0.3
}
fn default_burn_in_steps() -> u64 {
    171
}
fn default_measure_steps() -> u64 {
    20
}
fn default_age_range() -> usize {
    crate::compute::AGE_RANGE
}

impl EvaluationConfig {
    /// Validate evaluation parameters.
    pub fn validate(&self) -> Result<(), SearchConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(SearchConfigError::InvalidEvaluationGrid);
        }
        if !(0.0..=1.0).contains(&self.fill_ratio) {
            return Err(SearchConfigError::InvalidFillRatio(self.fill_ratio));
        }
        if self.age_range == 0 {
            return Err(SearchConfigError::InvalidAgeRange);
        }
        Ok(())
    }
}

/// What a bounded search does when it runs out of attempts or time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExhaustionPolicy {
    /// Return the best-scoring candidate seen so far.
    #[default]
    BestSeen,
    /// Fail with `SearchError::Exhausted`.
    Fail,
}

/// Rule search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum score a candidate needs to be accepted.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Maximum number of candidates to score. `None` searches forever.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: Option<usize>,
    /// Wall-clock limit in seconds. `None` means no limit.
    #[serde(default)]
    pub max_duration_secs: Option<f64>,
    /// Behaviour once a limit is hit.
    #[serde(default)]
    pub on_exhaustion: ExhaustionPolicy,
    /// Candidates scored in parallel per round.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Fitness protocol settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_attempts: default_max_attempts(),
            max_duration_secs: None,
            on_exhaustion: ExhaustionPolicy::default(),
            batch_size: default_batch_size(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

fn default_threshold() -> f64 {
    -1.0
}
fn default_max_attempts() -> Option<usize> {
    Some(5000)
}
fn default_batch_size() -> usize {
    1
}

impl SearchConfig {
    /// Unbounded search with the reference protocol.
    pub fn unbounded(threshold: f64) -> Self {
        Self {
            threshold,
            max_attempts: None,
            max_duration_secs: None,
            ..Default::default()
        }
    }

    /// Validate search parameters.
    pub fn validate(&self) -> Result<(), SearchConfigError> {
        if !self.threshold.is_finite() {
            return Err(SearchConfigError::InvalidThreshold(self.threshold));
        }
        if self.max_attempts == Some(0) {
            return Err(SearchConfigError::ZeroAttempts);
        }
        if let Some(secs) = self.max_duration_secs
            && !(secs > 0.0 && secs.is_finite())
        {
            return Err(SearchConfigError::InvalidDuration(secs));
        }
        if self.batch_size == 0 {
            return Err(SearchConfigError::ZeroBatchSize);
        }
        self.evaluation.validate()
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// A candidate scored at or above the threshold.
    ThresholdReached,
    /// Attempt limit hit; the best candidate seen was returned.
    AttemptsExhausted,
    /// Time limit hit; the best candidate seen was returned.
    TimeExhausted,
}

/// Result of a completed rule search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// The selected rule.
    pub rule: Rule,
    /// Its fitness score (may be `-inf` if nothing better was seen).
    pub score: f64,
    /// Candidates scored, including the selected one.
    pub attempts: usize,
    /// Wall-clock time spent searching.
    pub elapsed_seconds: f64,
    /// Why the search stopped.
    pub stop_reason: StopReason,
}

/// Search configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchConfigError {
    #[error("Search threshold must be finite, got {0}")]
    InvalidThreshold(f64),
    #[error("Maximum attempts must be at least 1")]
    ZeroAttempts,
    #[error("Maximum duration must be positive and finite, got {0}")]
    InvalidDuration(f64),
    #[error("Batch size must be at least 1")]
    ZeroBatchSize,
    #[error("Evaluation grid dimensions must be non-zero")]
    InvalidEvaluationGrid,
    #[error("Evaluation fill ratio must be within [0, 1], got {0}")]
    InvalidFillRatio(f64),
    #[error("Age range must be non-zero")]
    InvalidAgeRange,
}
