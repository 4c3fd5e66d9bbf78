//! Fixed-step explicit integrators.
//!
//! Every scheme implements [`FixedStepper`]: it advances the state by exactly
//! the requested step or fails. There is no adaptive fallback and no error
//! estimation.
//!
//! | kind | order | stages |
//! |------|-------|--------|
//! | [`SchemeKind::Euler`]    | 1 | 1 |
//! | [`SchemeKind::Midpoint`] | 2 | 2 |
//! | [`SchemeKind::Rk4`]      | 4 | 4 |

use std::fmt;
use std::str::FromStr;

use crate::core::traits::{FixedStepper, OdeSystem};
use crate::error::StepError;
use num_traits::Float;

pub mod euler;
pub use euler::Euler;

pub mod midpoint;
pub use midpoint::Midpoint;

pub mod rk4;
pub use rk4::Rk4;

/// Enum representing the available fixed-step schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemeKind {
    /// Forward Euler
    Euler,
    /// Explicit midpoint (RK2)
    Midpoint,
    /// Classical Runge–Kutta (RK4)
    #[default]
    Rk4,
}

impl SchemeKind {
    /// Build a fresh stepper with empty scratch space.
    pub fn stepper<T: Float>(self) -> AnyStepper<T> {
        match self {
            SchemeKind::Euler => AnyStepper::Euler(Euler::new()),
            SchemeKind::Midpoint => AnyStepper::Midpoint(Midpoint::new()),
            SchemeKind::Rk4 => AnyStepper::Rk4(Rk4::new()),
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemeKind::Euler => "euler",
            SchemeKind::Midpoint => "midpoint",
            SchemeKind::Rk4 => "rk4",
        };
        f.write_str(name)
    }
}

impl FromStr for SchemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euler" => Ok(SchemeKind::Euler),
            "midpoint" | "rk2" => Ok(SchemeKind::Midpoint),
            "rk4" => Ok(SchemeKind::Rk4),
            other => Err(format!("unknown scheme '{other}' (expected euler, midpoint or rk4)")),
        }
    }
}

/// A stepper of any kind, dispatched by `match`.
pub enum AnyStepper<T> {
    Euler(Euler<T>),
    Midpoint(Midpoint<T>),
    Rk4(Rk4<T>),
}

impl<T: Float> FixedStepper<T> for AnyStepper<T> {
    fn order(&self) -> usize {
        match self {
            AnyStepper::Euler(s) => s.order(),
            AnyStepper::Midpoint(s) => s.order(),
            AnyStepper::Rk4(s) => s.order(),
        }
    }

    fn step<S: OdeSystem<T>>(
        &mut self,
        system: &S,
        t: &mut T,
        h: T,
        y: &mut [T],
    ) -> Result<(), StepError> {
        match self {
            AnyStepper::Euler(s) => s.step(system, t, h, y),
            AnyStepper::Midpoint(s) => s.step(system, t, h, y),
            AnyStepper::Rk4(s) => s.step(system, t, h, y),
        }
    }
}

/// Shared precondition checks: positive finite step, matching dimension.
pub(crate) fn check_step<T: Float, S: OdeSystem<T>>(
    system: &S,
    h: T,
    y: &[T],
) -> Result<(), StepError> {
    if !(h.is_finite() && h > T::zero()) {
        return Err(StepError::InvalidStepSize(h.to_f64().unwrap_or(f64::NAN)));
    }
    let expected = system.dimension();
    if y.len() != expected {
        return Err(StepError::DimensionMismatch { expected, found: y.len() });
    }
    Ok(())
}

pub(crate) fn check_finite<T: Float>(y: &[T]) -> Result<(), StepError> {
    match y.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(StepError::NonFinite { index }),
        None => Ok(()),
    }
}
