//! Plan-level optimization passes.

mod annealer;

pub use annealer::AnnealingPlanner;
