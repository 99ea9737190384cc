//! Ecosystem simulation engine.
//!
//! This crate holds the double-buffered cell grid, the population initializer,
//! the per-tick update kernel and the simulation driver that ties them together.

pub mod grid;
pub mod kernel;
pub mod population;
pub mod simulation;
pub mod stats;

pub use grid::Grid;
pub use kernel::PassReport;
pub use simulation::{Simulation, SimulationState};
pub use stats::GridStats;
