//! Run configuration.
//!
//! `SimulationConfig` is the physical and numerical setup shared verbatim by
//! every worker. `RunOptions` holds the per-invocation knobs (seed, backend,
//! worker count, output destination) that the binary collects from the
//! command line.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SimError;
use crate::integrator::SchemeKind;

pub const DEFAULT_REPLICATES: usize = 1000;
pub const DEFAULT_STEPS: usize = 200;
pub const DEFAULT_STEP_SIZE: f64 = 0.01;
pub const DEFAULT_STIFFNESS: f64 = 9000.0;
pub const DEFAULT_MASS: f64 = 450.0;
pub const DEFAULT_DAMPING_MIN: f64 = 800.0;
pub const DEFAULT_DAMPING_MAX: f64 = 1200.0;
pub const DEFAULT_SEED: u64 = 0x5EED;
pub const DEFAULT_OUTPUT: &str = "mean_trajectory.dat";

/// Physical constants and discretisation, identical on every worker.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Total replicate count R across all workers
    pub replicates: usize,
    /// Samples per trajectory, including t = 0
    pub steps: usize,
    /// Fixed step size H
    pub step_size: f64,
    /// Spring stiffness K
    pub stiffness: f64,
    /// Mass M
    pub mass: f64,
    /// Lower bound of the damping distribution
    pub damping_min: f64,
    /// Upper bound of the damping distribution
    pub damping_max: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            replicates: DEFAULT_REPLICATES,
            steps: DEFAULT_STEPS,
            step_size: DEFAULT_STEP_SIZE,
            stiffness: DEFAULT_STIFFNESS,
            mass: DEFAULT_MASS,
            damping_min: DEFAULT_DAMPING_MIN,
            damping_max: DEFAULT_DAMPING_MAX,
        }
    }
}

impl SimulationConfig {
    /// Reject configurations that cannot produce a meaningful mean.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.replicates == 0 {
            return Err(SimError::Config("replicate count must be at least 1".into()));
        }
        if self.steps == 0 {
            return Err(SimError::Config("step count must be at least 1".into()));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(SimError::Config(format!(
                "step size must be finite and > 0, got {}",
                self.step_size
            )));
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(SimError::Config(format!("mass must be finite and > 0, got {}", self.mass)));
        }
        if !self.stiffness.is_finite() {
            return Err(SimError::Config(format!("stiffness must be finite, got {}", self.stiffness)));
        }
        if !(self.damping_min.is_finite() && self.damping_max.is_finite()) {
            return Err(SimError::Config("damping bounds must be finite".into()));
        }
        if self.damping_min > self.damping_max {
            return Err(SimError::Config(format!(
                "damping_min ({}) exceeds damping_max ({})",
                self.damping_min, self.damping_max
            )));
        }
        Ok(())
    }

    /// Simulated horizon covered by one trajectory.
    pub fn horizon(&self) -> f64 {
        self.step_size * self.steps.saturating_sub(1) as f64
    }
}

/// Which collective backend executes the workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// One worker in the calling thread
    Serial,
    /// In-process world of worker threads
    Threads,
    /// One worker per MPI process
    Mpi,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serial" => Ok(Backend::Serial),
            "threads" | "thread" => Ok(Backend::Threads),
            "mpi" => Ok(Backend::Mpi),
            other => Err(format!("unknown backend '{other}' (expected serial, threads or mpi)")),
        }
    }
}

/// How partial sums travel to the coordinator in the thread backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReduceStrategy {
    /// Binomial tree, ⌈log₂ W⌉ rounds
    #[default]
    Tree,
    /// Coordinator receives from every peer in rank order
    Linear,
}

impl std::str::FromStr for ReduceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(ReduceStrategy::Tree),
            "linear" => Ok(ReduceStrategy::Linear),
            other => Err(format!("unknown reduction '{other}' (expected tree or linear)")),
        }
    }
}

/// Per-invocation options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub backend: Backend,
    /// Worker count for the thread backend (ignored by serial and MPI)
    pub workers: usize,
    pub scheme: SchemeKind,
    pub reduce: ReduceStrategy,
    /// Run-level seed; each worker derives its own stream from it
    pub seed: u64,
    /// Use this damping for every replicate instead of sampling
    pub fixed_damping: Option<f64>,
    /// Deadline for each collective (thread backend only)
    pub timeout: Option<Duration>,
    pub output: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            backend: Backend::Threads,
            workers: 1,
            scheme: SchemeKind::Rk4,
            reduce: ReduceStrategy::Tree,
            seed: DEFAULT_SEED,
            fixed_damping: None,
            timeout: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl RunOptions {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.backend == Backend::Threads && self.workers == 0 {
            return Err(SimError::Config("worker count must be at least 1".into()));
        }
        if let Some(d) = self.fixed_damping {
            if !d.is_finite() {
                return Err(SimError::Config(format!("fixed damping must be finite, got {d}")));
            }
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(SimError::Config("timeout must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.replicates, 1000);
        assert_eq!(cfg.steps, 200);
        assert!(cfg.validate().is_ok());
        assert!(RunOptions::default().validate().is_ok());
        assert!((cfg.horizon() - 1.99).abs() < 1e-12);
    }

    #[test]
    fn zero_replicates_rejected() {
        let cfg = SimulationConfig { replicates: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn bad_numerics_rejected() {
        let base = SimulationConfig::default();
        for cfg in [
            SimulationConfig { step_size: 0.0, ..base.clone() },
            SimulationConfig { step_size: -0.01, ..base.clone() },
            SimulationConfig { step_size: f64::INFINITY, ..base.clone() },
            SimulationConfig { mass: 0.0, ..base.clone() },
            SimulationConfig { steps: 0, ..base.clone() },
            SimulationConfig { damping_min: 1300.0, ..base.clone() },
            SimulationConfig { stiffness: f64::NAN, ..base.clone() },
        ] {
            assert!(matches!(cfg.validate(), Err(SimError::Config(_))), "{:?}", cfg);
        }
    }

    #[test]
    fn parse_backend_and_strategy() {
        assert_eq!("threads".parse::<Backend>().unwrap(), Backend::Threads);
        assert_eq!("MPI".parse::<Backend>().unwrap(), Backend::Mpi);
        assert!("gpu".parse::<Backend>().is_err());
        assert_eq!("linear".parse::<ReduceStrategy>().unwrap(), ReduceStrategy::Linear);
    }
}
