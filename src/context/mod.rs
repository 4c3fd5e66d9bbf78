//! Run context for the ensemble.
//!
//! [`EnsembleContext`] bundles configuration, integrator kind, damping
//! sampler, seed and coordinator rank, and runs the worker program on any
//! [`Comm`](crate::parallel::Comm) backend.
//!
//! # Example
//! ```rust
//! use mcdamp::config::SimulationConfig;
//! use mcdamp::context::EnsembleContext;
//! use mcdamp::parallel::SerialComm;
//!
//! let cfg = SimulationConfig { replicates: 8, steps: 20, ..Default::default() };
//! let ctx = EnsembleContext::new(cfg).unwrap();
//! let mean = ctx.run(&SerialComm::new()).unwrap().unwrap();
//! assert_eq!(mean.len(), 20);
//! ```

pub mod ensemble_context;
pub use ensemble_context::EnsembleContext;
