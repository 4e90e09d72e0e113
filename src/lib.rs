//! Weighted Life - Cellular automata with weighted neighbourhoods.
//!
//! Each cell sums integer weights over its live Moore neighbours and compares
//! the total against survival and birth thresholds. Live cells carry an age,
//! which drives colouring. Rules are drawn at random and kept only if an
//! aesthetic fitness score computed from a short trial run clears a threshold.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Rules and configuration types
//! - `compute`: Stepping, fitness, rule search and the simulation driver
//!
//! # Example
//!
//! ```rust,no_run
//! use weighted_life::{
//!     compute::{Grid, LifeRng, step},
//!     schema::{Rule, SimulationConfig},
//!     Simulation,
//! };
//!
//! // Step a grid directly
//! let mut rng = LifeRng::new(7);
//! let grid = Grid::random(64, 48, 0.3, &mut rng).unwrap();
//! let result = step(&grid, &Rule::CONWAY);
//! println!("{} births, {} alive", result.births, result.live_count);
//!
//! // Or let the driver rotate through discovered rules
//! let mut simulation = Simulation::new(SimulationConfig::default()).unwrap();
//! let report = simulation.advance(100);
//! println!("Rule after 100 generations: {:?}", simulation.rule());
//! println!("{} events", report.events.len());
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{Cell, Grid, LifeRng, Palette, Simulation, SimulationEvent, step};
pub use schema::{Rule, SearchConfig, SimulationConfig};
