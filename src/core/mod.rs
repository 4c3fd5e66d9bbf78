//! Core traits and state types.

pub mod state;
pub mod traits;

pub use state::OscillatorState;
pub use traits::{FixedStepper, OdeSystem};
