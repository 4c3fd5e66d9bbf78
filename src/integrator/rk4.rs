//! Classical fourth-order Runge–Kutta with a fixed step.
//!
//! ```text
//! k1 = f(t,       y)
//! k2 = f(t + h/2, y + h/2·k1)
//! k3 = f(t + h/2, y + h/2·k2)
//! k4 = f(t + h,   y + h·k3)
//! y ← y + h/6·(k1 + 2k2 + 2k3 + k4)
//! ```
//!
//! The stage buffers live in the stepper so a worker allocates them once and
//! reuses them for every replicate it runs.

use crate::core::traits::{FixedStepper, OdeSystem};
use crate::error::StepError;
use crate::integrator::{check_finite, check_step};
use num_traits::Float;

pub struct Rk4<T> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    ytmp: Vec<T>,
}

impl<T: Float> Rk4<T> {
    pub fn new() -> Self {
        Self { k1: Vec::new(), k2: Vec::new(), k3: Vec::new(), k4: Vec::new(), ytmp: Vec::new() }
    }

    fn resize(&mut self, n: usize) {
        if self.k1.len() != n {
            self.k1.resize(n, T::zero());
            self.k2.resize(n, T::zero());
            self.k3.resize(n, T::zero());
            self.k4.resize(n, T::zero());
            self.ytmp.resize(n, T::zero());
        }
    }
}

impl<T: Float> Default for Rk4<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FixedStepper<T> for Rk4<T> {
    fn order(&self) -> usize {
        4
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
        self.resize(n);

        let two = T::one() + T::one();
        let half_h = h / two;
        let sixth_h = h / (two + two + two);

        system.rhs(*t, y, &mut self.k1);
        for i in 0..n {
            self.ytmp[i] = y[i] + half_h * self.k1[i];
        }
        system.rhs(*t + half_h, &self.ytmp, &mut self.k2);
        for i in 0..n {
            self.ytmp[i] = y[i] + half_h * self.k2[i];
        }
        system.rhs(*t + half_h, &self.ytmp, &mut self.k3);
        for i in 0..n {
            self.ytmp[i] = y[i] + h * self.k3[i];
        }
        system.rhs(*t + h, &self.ytmp, &mut self.k4);

        for i in 0..n {
            y[i] = y[i]
                + sixth_h * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }
        *t = *t + h;
        check_finite(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Decay;
    impl OdeSystem<f64> for Decay {
        fn dimension(&self) -> usize {
            1
        }
        fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
            dydt[0] = -y[0];
        }
    }

    #[test]
    fn rk4_exponential_decay() {
        let mut rk = Rk4::new();
        let mut y = vec![1.0];
        let mut t = 0.0;
        for _ in 0..100 {
            rk.step(&Decay, &mut t, 0.01, &mut y).unwrap();
        }
        assert!((t - 1.0).abs() < 1e-12);
        assert!((y[0] - (-1.0f64).exp()).abs() < 1e-10, "y = {}", y[0]);
    }

    #[test]
    fn rk4_rejects_zero_step() {
        let mut rk = Rk4::new();
        let mut y = vec![1.0];
        let mut t = 0.0;
        let err = rk.step(&Decay, &mut t, 0.0, &mut y).unwrap_err();
        assert_eq!(err, StepError::InvalidStepSize(0.0));
        assert_eq!(t, 0.0);
        assert_eq!(y[0], 1.0);
    }
}
