//! Sample-and-reject rule search.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::schema::{
    ExhaustionPolicy, Rule, SearchConfig, SearchConfigError, SearchOutcome, StopReason,
};

use super::fitness::FitnessEvaluator;
use super::genome::random_rule;

/// A scored candidate rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub rule: Rule,
    pub score: f64,
}

/// Progress reported after each scored batch.
#[derive(Debug, Clone, Copy)]
pub struct SearchProgress {
    /// Candidates scored so far.
    pub attempts: usize,
    /// Best score seen so far.
    pub best_score: f64,
    /// Best score in the latest batch.
    pub batch_best: f64,
}

/// Search failures.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("No rule reached the threshold after {attempts} attempts (best score {best_score})")]
    Exhausted { attempts: usize, best_score: f64 },
    #[error("Search cancelled after {attempts} attempts")]
    Cancelled { attempts: usize },
    #[error("Search worker stopped without reporting a result")]
    Disconnected,
}

/// Bounded, cancellable rule search.
pub struct RuleSearch {
    config: SearchConfig,
    evaluator: FitnessEvaluator,
    cancelled: Arc<AtomicBool>,
}

impl RuleSearch {
    /// Create a new search.
    pub fn new(config: SearchConfig) -> Result<Self, SearchConfigError> {
        config.validate()?;
        let evaluator = FitnessEvaluator::new(config.evaluation.clone())?;
        Ok(Self {
            config,
            evaluator,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Share an existing cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = flag;
        self
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the search (blocking).
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SearchOutcome, SearchError> {
        self.run_with_callback(rng, |_| {})
    }

    /// Run the search, reporting progress after every batch.
    ///
    /// Candidates are accepted in the order they were drawn, so the result
    /// only depends on `rng` and the configuration, not on thread timing.
    pub fn run_with_callback<R, F>(
        &self,
        rng: &mut R,
        mut callback: F,
    ) -> Result<SearchOutcome, SearchError>
    where
        R: Rng + ?Sized,
        F: FnMut(&SearchProgress),
    {
        let start = Instant::now();
        let deadline = self.config.max_duration_secs.map(Duration::from_secs_f64);
        let mut attempts = 0usize;
        let mut best: Option<Candidate> = None;

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                log::debug!("Rule search cancelled after {} attempts", attempts);
                return Err(SearchError::Cancelled { attempts });
            }

            let batch_size = match self.config.max_attempts {
                Some(max) => self.config.batch_size.min(max - attempts),
                None => self.config.batch_size,
            };
            let batch = self.score_batch(batch_size, rng);
            if batch.len() < batch_size {
                attempts += batch.len();
                log::debug!("Rule search cancelled mid-batch after {} attempts", attempts);
                return Err(SearchError::Cancelled { attempts });
            }

            let mut batch_best = f64::NEG_INFINITY;
            for candidate in batch {
                attempts += 1;
                batch_best = batch_best.max(candidate.score);
                if candidate.score >= self.config.threshold {
                    log::info!(
                        "Accepted rule after {} attempts (score {:.4})",
                        attempts,
                        candidate.score
                    );
                    return Ok(outcome(
                        candidate,
                        attempts,
                        start,
                        StopReason::ThresholdReached,
                    ));
                }
                if best.is_none_or(|b| candidate.score > b.score) {
                    best = Some(candidate);
                }
            }

            let best_score = best.map_or(f64::NEG_INFINITY, |b| b.score);
            log::debug!(
                "Rejected batch: {} attempts, batch best {:.4}, overall best {:.4}",
                attempts,
                batch_best,
                best_score
            );
            callback(&SearchProgress {
                attempts,
                best_score,
                batch_best,
            });

            if self.config.max_attempts.is_some_and(|max| attempts >= max) {
                return self.exhausted(best, attempts, start, StopReason::AttemptsExhausted);
            }
            if deadline.is_some_and(|limit| start.elapsed() >= limit) {
                return self.exhausted(best, attempts, start, StopReason::TimeExhausted);
            }
        }
    }

    /// Draw and score `count` candidates.
    ///
    /// With a batch size of one the caller's stream feeds both the rule and
    /// its evaluation grid. Otherwise every rule and a child seed are drawn
    /// up front and evaluated in parallel. Candidates skipped after
    /// cancellation are left out, so a short batch means the search was
    /// cancelled.
    fn score_batch<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Candidate> {
        if self.config.batch_size == 1 {
            let rule = random_rule(rng);
            let score = self.evaluator.evaluate(&rule, rng).score;
            return vec![Candidate { rule, score }];
        }

        let draws: Vec<(Rule, u64)> = (0..count)
            .map(|_| (random_rule(rng), rng.r#gen()))
            .collect();
        draws
            .into_par_iter()
            .filter_map(|(rule, seed)| {
                if self.cancelled.load(Ordering::Relaxed) {
                    return None;
                }
                let mut child = StdRng::seed_from_u64(seed);
                let score = self.evaluator.evaluate(&rule, &mut child).score;
                Some(Candidate { rule, score })
            })
            .collect()
    }

    fn exhausted(
        &self,
        best: Option<Candidate>,
        attempts: usize,
        start: Instant,
        reason: StopReason,
    ) -> Result<SearchOutcome, SearchError> {
        let best_score = best.map_or(f64::NEG_INFINITY, |b| b.score);
        log::warn!(
            "Rule search exhausted ({:?}) after {} attempts, best score {:.4}",
            reason,
            attempts,
            best_score
        );
        match (self.config.on_exhaustion, best) {
            (ExhaustionPolicy::BestSeen, Some(candidate)) => {
                Ok(outcome(candidate, attempts, start, reason))
            }
            _ => Err(SearchError::Exhausted {
                attempts,
                best_score,
            }),
        }
    }
}

fn outcome(
    candidate: Candidate,
    attempts: usize,
    start: Instant,
    stop_reason: StopReason,
) -> SearchOutcome {
    SearchOutcome {
        rule: candidate.rule,
        score: candidate.score,
        attempts,
        elapsed_seconds: start.elapsed().as_secs_f64(),
        stop_reason,
    }
}

/// Draw rules until one scores at least `threshold` under the reference
/// protocol. Has no attempt limit; see [`RuleSearch`] for a bounded search.
pub fn find_good_rule<R: Rng + ?Sized>(threshold: f64, rng: &mut R) -> Rule {
    let evaluator = FitnessEvaluator::default();
    loop {
        let rule = random_rule(rng);
        if evaluator.evaluate(&rule, rng).score >= threshold {
            return rule;
        }
    }
}
