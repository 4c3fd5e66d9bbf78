//! One replicate: a full trajectory for a single damping draw.

use crate::config::SimulationConfig;
use crate::core::state::OscillatorState;
use crate::core::traits::FixedStepper;
use crate::error::SimError;
use crate::model::DampedOscillator;

/// Runs trajectories with a stepper whose scratch space it owns.
pub struct ReplicateSimulator<'a, S> {
    config: &'a SimulationConfig,
    stepper: S,
    rank: usize,
}

impl<'a, S: FixedStepper<f64>> ReplicateSimulator<'a, S> {
    pub fn new(config: &'a SimulationConfig, stepper: S) -> Self {
        Self { config, stepper, rank: 0 }
    }

    /// Rank reported in integration errors.
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    /// Integrate one replicate and write its displacement at every step into
    /// `out`, which must hold exactly `config.steps` values.
    pub fn run_into(&mut self, damping: f64, out: &mut [f64]) -> Result<(), SimError> {
        let cfg = self.config;
        assert_eq!(out.len(), cfg.steps, "displacement buffer has incorrect length");
        if out.is_empty() {
            return Ok(());
        }
        let osc = DampedOscillator::new(cfg.stiffness, damping, cfg.mass);
        let mut state = OscillatorState::<f64>::initial();
        out[0] = state.displacement();
        for step in 1..cfg.steps {
            self.stepper
                .step(&osc, &mut state.time, cfg.step_size, &mut state.y[..])
                .map_err(|source| SimError::Integration {
                    rank: self.rank,
                    step,
                    time: state.time,
                    source,
                })?;
            out[step] = state.displacement();
        }
        Ok(())
    }

    /// Convenience wrapper returning a freshly allocated trajectory.
    pub fn run(&mut self, damping: f64) -> Result<Vec<f64>, SimError> {
        let mut out = vec![0.0; self.config.steps];
        self.run_into(damping, &mut out)?;
        Ok(out)
    }
}

/// Sample times `0, h, 2h, …`, accumulated by repeated addition exactly as the
/// steppers advance their clock.
pub fn time_vector(steps: usize, step_size: f64) -> Vec<f64> {
    let mut t = 0.0;
    let mut out = Vec::with_capacity(steps);
    for _ in 0..steps {
        out.push(t);
        t += step_size;
    }
    out
}
