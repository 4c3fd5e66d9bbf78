//! Core ODE traits for mcdamp.

use crate::error::StepError;

/// Right-hand side of a first-order system y' = f(t, y).
pub trait OdeSystem<T> {
    /// Number of state components.
    fn dimension(&self) -> usize;

    /// Write f(t, y) into `dydt`.
    fn rhs(&self, t: T, y: &[T], dydt: &mut [T]);

    /// Jacobian ∂f/∂y at (t, y), if the system provides one.
    ///
    /// Explicit schemes never call this.
    fn jacobian(&self, _t: T, _y: &[T]) -> Option<faer::Mat<T>> {
        None
    }
}

/// Advance a state by exactly one step of size `h`.
pub trait FixedStepper<T> {
    /// Order of accuracy of the scheme.
    fn order(&self) -> usize;

    /// Advance `(t, y)` to `(t + h, y(t + h))` in place.
    ///
    /// Never substitutes a different step; returns an error instead.
    fn step<S: OdeSystem<T>>(
        &mut self,
        system: &S,
        t: &mut T,
        h: T,
        y: &mut [T],
    ) -> Result<(), StepError>;
}
