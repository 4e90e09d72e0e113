//! Compute module - Grid stepping, rule discovery and simulation driving.

mod background;
mod grid;
mod palette;
mod rng;
mod simulation;
mod stepper;

pub mod evolution;

pub use background::*;
pub use grid::*;
pub use palette::*;
pub use rng::*;
pub use simulation::*;
pub use stepper::*;
