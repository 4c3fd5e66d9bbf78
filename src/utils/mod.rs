//! Small helpers shared by the driver and the binary.

pub mod stats;
pub use stats::RunStats;
