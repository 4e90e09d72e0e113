//! Rule discovery: random generation, fitness scoring and search.
//!
//! # Overview
//!
//! - **Rule generation** (`genome`): random weighted rules with ordered thresholds
//! - **Fitness** (`fitness`): the fixed burn-in/measure protocol and its score
//! - **Search** (`search`): sample-and-reject until a rule clears a threshold
//!
//! # Example
//!
//! ```rust,no_run
//! use weighted_life::compute::LifeRng;
//! use weighted_life::compute::evolution::RuleSearch;
//! use weighted_life::schema::SearchConfig;
//!
//! let search = RuleSearch::new(SearchConfig::default()).unwrap();
//! let outcome = search.run(&mut LifeRng::new(42)).unwrap();
//! println!("score {:.3} after {} attempts", outcome.score, outcome.attempts);
//! ```

mod fitness;
mod genome;
mod search;

pub use fitness::{
    FitnessEvaluator, FitnessReport, TrajectoryMetrics, fitness, goodness, log_term,
};
pub use genome::random_rule;
pub use search::{Candidate, RuleSearch, SearchError, SearchProgress, find_good_rule};
