// Explicit midpoint (second-order Runge–Kutta)

use crate::core::traits::{FixedStepper, OdeSystem};
use crate::error::StepError;
use crate::integrator::{check_finite, check_step};
use num_traits::Float;

/// y ← y + h·f(t + h/2, y + h/2·f(t, y))
pub struct Midpoint<T> {
    k1: Vec<T>,
    k2: Vec<T>,
    ytmp: Vec<T>,
}

impl<T: Float> Midpoint<T> {
    pub fn new() -> Self {
        Self { k1: Vec::new(), k2: Vec::new(), ytmp: Vec::new() }
    }
}

impl<T: Float> Default for Midpoint<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FixedStepper<T> for Midpoint<T> {
    fn order(&self) -> usize {
        2
    }

    fn step<S: OdeSystem<T>>(
        &mut self,
        system: &S,
        t: &mut T,
        h: T,
        y: &mut [T],
    ) -> Result<(), StepError> {
        check_step(system, h, y)?;
        let n = y.len();
        if self.k1.len() != n {
            self.k1.resize(n, T::zero());
            self.k2.resize(n, T::zero());
            self.ytmp.resize(n, T::zero());
        }
        let half_h = h / (T::one() + T::one());

        system.rhs(*t, y, &mut self.k1);
        for i in 0..n {
            self.ytmp[i] = y[i] + half_h * self.k1[i];
        }
        system.rhs(*t + half_h, &self.ytmp, &mut self.k2);
        for i in 0..n {
            y[i] = y[i] + h * self.k2[i];
        }
        *t = *t + h;
        check_finite(y)
    }
}
