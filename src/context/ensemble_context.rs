//! The worker program.
//!
//! `EnsembleContext` holds everything a worker needs (configuration, scheme,
//! damping sampler, run seed, coordinator rank) and runs the single-phase
//! Monte-Carlo program against any [`Comm`]:
//!
//! 1. take this rank's share of the replicates,
//! 2. integrate them one after another, summing displacements locally,
//! 3. meet the other workers at a barrier,
//! 4. sum-reduce the local vectors onto the coordinator,
//! 5. on the coordinator, divide by R.
//!
//! Any failure is fatal for the whole run: the failing worker aborts the
//! collectives so the others return an error as well.

use std::time::Instant;

use log::{debug, info};

use crate::config::{RunOptions, SimulationConfig};
use crate::ensemble::{
    DampingSampler, LocalAccumulator, MeanTrajectory, ReplicateSimulator, local_range,
    time_vector, worker_rng,
};
use crate::error::{CommError, SimError};
use crate::integrator::SchemeKind;
use crate::parallel::Comm;
use crate::utils::stats::RunStats;

#[cfg(feature = "rayon")]
use crate::parallel::ThreadWorld;

/// Context and configuration for one ensemble run.
#[derive(Debug, Clone)]
pub struct EnsembleContext {
    pub config: SimulationConfig,
    pub scheme: SchemeKind,
    pub sampler: DampingSampler,
    /// Run-level seed; worker streams derive from it
    pub seed: u64,
    /// Rank that receives the global sum
    pub root: usize,
}

impl EnsembleContext {
    /// Validates `config`; uniform damping over its bounds, RK4, root 0.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let sampler = DampingSampler::from_config(&config, None);
        Ok(Self {
            config,
            scheme: SchemeKind::Rk4,
            sampler,
            seed: crate::config::options::DEFAULT_SEED,
            root: 0,
        })
    }

    pub fn from_options(config: SimulationConfig, opts: &RunOptions) -> Result<Self, SimError> {
        opts.validate()?;
        let sampler = DampingSampler::from_config(&config, opts.fixed_damping);
        Ok(Self::new(config)?.with_scheme(opts.scheme).with_sampler(sampler).with_seed(opts.seed))
    }

    pub fn with_scheme(mut self, scheme: SchemeKind) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_sampler(mut self, sampler: DampingSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_root(mut self, root: usize) -> Self {
        self.root = root;
        self
    }

    /// Run this rank's replicates and return the local sum.
    pub fn simulate_local(
        &self,
        rank: usize,
        workers: usize,
    ) -> Result<(LocalAccumulator, RunStats), SimError> {
        let cfg = &self.config;
        let start = Instant::now();
        let range = local_range(cfg.replicates, workers, rank)?;
        debug!("{:3}: l_rep={} (replicates {:?})", rank, range.len(), range);

        let mut rng = worker_rng(self.seed, rank);
        let mut sim = ReplicateSimulator::new(cfg, self.scheme.stepper()).with_rank(rank);
        let mut displacement = vec![0.0; cfg.steps];
        let mut acc = LocalAccumulator::new(cfg.steps);
        for _ in range.clone() {
            let damping = self.sampler.sample(&mut rng);
            sim.run_into(damping, &mut displacement)?;
            acc.add(&displacement);
        }

        let stats = RunStats {
            rank,
            workers,
            replicates: range,
            steps: cfg.steps,
            elapsed: start.elapsed(),
        };
        Ok((acc, stats))
    }

    /// Execute the full worker program on `comm`.
    ///
    /// Returns `Some(mean)` on the coordinator and `None` on every other rank.
    pub fn run<C: Comm>(&self, comm: &C) -> Result<Option<MeanTrajectory>, SimError> {
        let (rank, workers) = (comm.rank(), comm.size());
        // fields are public, so a context may have been built without `new`
        if let Err(e) = self.config.validate() {
            comm.abort();
            return Err(e);
        }
        if self.root >= workers {
            comm.abort();
            return Err(SimError::Config(format!(
                "coordinator rank {} outside a world of {} workers",
                self.root, workers
            )));
        }

        let (acc, stats) = match self.simulate_local(rank, workers) {
            Ok(local) => local,
            Err(e) => {
                comm.abort();
                return Err(e);
            }
        };
        debug!(
            "{:3}/{}: {} replicate(s) done in {:?} ({:.0} steps/s)",
            rank,
            stats.workers,
            stats.local_replicates(),
            stats.elapsed,
            stats.steps_per_second()
        );

        let reduced = comm.barrier().and_then(|()| comm.reduce_sum(acc.as_slice(), self.root));
        let global = match reduced {
            Ok(global) => global,
            Err(e) => {
                comm.abort();
                return Err(e.into());
            }
        };

        match global {
            Some(sum) => {
                let time = time_vector(self.config.steps, self.config.step_size);
                let mean = MeanTrajectory::from_global_sum(time, sum, self.config.replicates)?;
                info!(
                    "mean of {} replicate(s) over {} worker(s), {} step(s) of {} (t_end = {})",
                    mean.replicates,
                    workers,
                    self.config.steps,
                    self.config.step_size,
                    self.config.horizon()
                );
                Ok(Some(mean))
            }
            None => Ok(None),
        }
    }

    /// Run the whole ensemble on an in-process world and return the
    /// coordinator's mean.
    ///
    /// When workers fail, the error of the worker that caused the failure is
    /// returned rather than the "peer aborted" errors of the others.
    #[cfg(feature = "rayon")]
    pub fn run_threads(&self, world: &ThreadWorld) -> Result<MeanTrajectory, SimError> {
        let results = world.run(|comm| self.run(&comm))?;
        let mut secondary = None;
        let mut mean = None;
        for result in results {
            match result {
                Ok(Some(m)) => mean = Some(m),
                Ok(None) => {}
                Err(e) if e.is_secondary() => {
                    secondary.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }
        if let Some(e) = secondary {
            return Err(e);
        }
        mean.ok_or_else(|| {
            SimError::Collective(CommError::Launch("coordinator returned no result".into()))
        })
    }
}
