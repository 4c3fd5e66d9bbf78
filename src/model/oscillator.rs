//! Damped mass–spring oscillator.
//!
//! m·x'' + d·x' + k·x = 0, written as the first-order system
//!
//! ```text
//! x' = v
//! v' = −(d/m)·v − (k/m)·x
//! ```
//!
//! The model is stateless: it only carries the three physical parameters of
//! one replicate. Replacing this type with another `OdeSystem` changes the
//! physics without touching the integrators or the ensemble driver.

use crate::core::traits::OdeSystem;
use num_traits::Float;

/// Parameters of one replicate: stiffness `k`, damping `d`, mass `m`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DampedOscillator<T> {
    pub stiffness: T,
    pub damping: T,
    pub mass: T,
}

impl<T: Float> DampedOscillator<T> {
    pub fn new(stiffness: T, damping: T, mass: T) -> Self {
        Self { stiffness, damping, mass }
    }

    /// Derivative `(dx/dt, dv/dt)` at state `(x, v)`.
    pub fn derivative(&self, x: T, v: T) -> (T, T) {
        let dv = -self.damping / self.mass * v - self.stiffness / self.mass * x;
        (v, dv)
    }
}

impl<T: Float> OdeSystem<T> for DampedOscillator<T> {
    fn dimension(&self) -> usize {
        2
    }

    fn rhs(&self, _t: T, y: &[T], dydt: &mut [T]) {
        let (dx, dv) = self.derivative(y[0], y[1]);
        dydt[0] = dx;
        dydt[1] = dv;
    }

    /// ```text
    /// | 0      1    |
    /// | −k/m   −d/m |
    /// ```
    fn jacobian(&self, _t: T, _y: &[T]) -> Option<faer::Mat<T>> {
        let k_m = self.stiffness / self.mass;
        let d_m = self.damping / self.mass;
        Some(faer::Mat::from_fn(2, 2, |i, j| match (i, j) {
            (0, 0) => T::zero(),
            (0, 1) => T::one(),
            (1, 0) => -k_m,
            _ => -d_m,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_at_rest_position() {
        let osc = DampedOscillator::new(9000.0, 1000.0, 450.0);
        let (dx, dv) = osc.derivative(0.0, 0.1);
        assert_eq!(dx, 0.1);
        assert!((dv - (-0.2222222222222222)).abs() < 1e-12, "dv = {}", dv);
    }

    #[test]
    fn rhs_matches_derivative() {
        let osc = DampedOscillator::new(9000.0, 800.0, 450.0);
        let y = [0.013, -0.4];
        let mut f = [0.0; 2];
        osc.rhs(0.0, &y, &mut f);
        let (dx, dv) = osc.derivative(y[0], y[1]);
        assert_eq!(f, [dx, dv]);
    }

    #[test]
    fn jacobian_entries() {
        let osc = DampedOscillator::new(9000.0, 900.0, 450.0);
        let j = osc.jacobian(0.0, &[0.0, 0.0]).unwrap();
        assert_eq!(j.nrows(), 2);
        assert_eq!(j.ncols(), 2);
        assert_eq!(j[(0, 0)], 0.0);
        assert_eq!(j[(0, 1)], 1.0);
        assert_eq!(j[(1, 0)], -20.0);
        assert_eq!(j[(1, 1)], -2.0);
    }
}
