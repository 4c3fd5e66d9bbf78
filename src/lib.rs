//! mcdamp: ensemble-averaged trajectories of a randomly damped oscillator
//!
//! Each of R replicates draws a damping coefficient from a uniform range,
//! integrates m·x'' + d·x' + k·x = 0 with a fixed-step scheme, and adds its
//! displacement history to a per-worker sum. The workers (threads or MPI
//! processes) meet once at a barrier and sum-reduce their partial vectors on
//! a coordinator, which divides by R and writes the mean trajectory.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod ensemble;
pub mod error;
pub mod integrator;
pub mod io;
pub mod model;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use crate::core::*;
pub use ensemble::*;
pub use error::*;
pub use integrator::{AnyStepper, SchemeKind};
pub use model::*;
pub use parallel::{Comm, SerialComm};
pub use utils::*;

#[cfg(feature = "rayon")]
pub use parallel::{ThreadComm, ThreadWorld};
