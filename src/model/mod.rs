//! Physical models integrated by the ensemble.

pub mod oscillator;
pub use oscillator::DampedOscillator;
