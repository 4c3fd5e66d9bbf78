// Forward Euler

use crate::core::traits::{FixedStepper, OdeSystem};
use crate::error::StepError;
use crate::integrator::{check_finite, check_step};
use num_traits::Float;

/// y ← y + h·f(t, y)
pub struct Euler<T> {
    k: Vec<T>,
}

impl<T: Float> Euler<T> {
    pub fn new() -> Self {
        Self { k: Vec::new() }
    }
}

impl<T: Float> Default for Euler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FixedStepper<T> for Euler<T> {
    fn order(&self) -> usize {
        1
    }

    fn step<S: OdeSystem<T>>(
        &mut self,
        system: &S,
        t: &mut T,
        h: T,
        y: &mut [T],
    ) -> Result<(), StepError> {
        check_step(system, h, y)?;
        if self.k.len() != y.len() {
            self.k.resize(y.len(), T::zero());
        }
        system.rhs(*t, y, &mut self.k);
        for (yi, ki) in y.iter_mut().zip(&self.k) {
            *yi = *yi + h * *ki;
        }
        *t = *t + h;
        check_finite(y)
    }
}
