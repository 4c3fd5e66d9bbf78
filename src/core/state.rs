//! Oscillator state: displacement, velocity and the clock.

use num_traits::Float;

/// State of one replicate while it is being integrated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorState<T> {
    /// `[displacement, velocity]`
    pub y: [T; 2],
    pub time: T,
}

impl<T: Float> OscillatorState<T> {
    pub fn new(displacement: T, velocity: T) -> Self {
        Self { y: [displacement, velocity], time: T::zero() }
    }

    /// Every replicate starts at rest position with velocity 0.1.
    pub fn initial() -> Self {
        let v0 = T::from(0.1).unwrap_or_else(T::zero);
        Self::new(T::zero(), v0)
    }

    pub fn displacement(&self) -> T {
        self.y[0]
    }
}
