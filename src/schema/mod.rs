//! Schema module - Configuration and rule types for weighted-life simulations.

mod config;
mod rule;
mod search;

pub use config::*;
pub use rule::*;
pub use search::*;
