//! Configuration types.

pub mod options;
pub use options::{Backend, ReduceStrategy, RunOptions, SimulationConfig};
