use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use mcdamp::config::options::{
    DEFAULT_DAMPING_MAX, DEFAULT_DAMPING_MIN, DEFAULT_MASS, DEFAULT_OUTPUT, DEFAULT_REPLICATES,
    DEFAULT_SEED, DEFAULT_STEP_SIZE, DEFAULT_STEPS, DEFAULT_STIFFNESS,
};
use mcdamp::config::{Backend, ReduceStrategy, RunOptions, SimulationConfig};
use mcdamp::context::EnsembleContext;
use mcdamp::ensemble::MeanTrajectory;
use mcdamp::error::SimError;
use mcdamp::integrator::SchemeKind;
use mcdamp::parallel::SerialComm;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Ensemble-averaged trajectory of a damped oscillator with random damping"
)]
struct Cli {
    /// Total number of replicates across all workers
    #[arg(long, default_value_t = DEFAULT_REPLICATES)]
    replicates: usize,

    /// Samples per trajectory, including t = 0
    #[arg(long, default_value_t = DEFAULT_STEPS)]
    steps: usize,

    /// Fixed integration step
    #[arg(long, default_value_t = DEFAULT_STEP_SIZE)]
    step_size: f64,

    /// Spring stiffness k
    #[arg(long, default_value_t = DEFAULT_STIFFNESS)]
    stiffness: f64,

    /// Mass m
    #[arg(long, default_value_t = DEFAULT_MASS)]
    mass: f64,

    /// Lower bound of the damping distribution
    #[arg(long, default_value_t = DEFAULT_DAMPING_MIN)]
    damping_min: f64,

    /// Upper bound of the damping distribution
    #[arg(long, default_value_t = DEFAULT_DAMPING_MAX)]
    damping_max: f64,

    /// Use this damping for every replicate (disables sampling)
    #[arg(long)]
    fixed_damping: Option<f64>,

    /// Run seed; each worker derives an independent stream from it
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Worker count for the thread backend [default: logical CPUs]
    #[arg(long)]
    workers: Option<usize>,

    /// serial, threads or mpi
    #[arg(long, default_value = "threads")]
    backend: Backend,

    /// euler, midpoint or rk4
    #[arg(long, default_value = "rk4")]
    scheme: SchemeKind,

    /// tree or linear (thread backend)
    #[arg(long, default_value = "tree")]
    reduce: ReduceStrategy,

    /// Deadline for the barrier and the reduction, in milliseconds (thread backend)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Where the coordinator writes the mean trajectory
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
}

impl Cli {
    fn into_parts(self) -> (SimulationConfig, RunOptions) {
        let config = SimulationConfig {
            replicates: self.replicates,
            steps: self.steps,
            step_size: self.step_size,
            stiffness: self.stiffness,
            mass: self.mass,
            damping_min: self.damping_min,
            damping_max: self.damping_max,
        };
        let opts = RunOptions {
            backend: self.backend,
            workers: self.workers.unwrap_or_else(default_workers),
            scheme: self.scheme,
            reduce: self.reduce,
            seed: self.seed,
            fixed_damping: self.fixed_damping,
            timeout: self.timeout_ms.map(Duration::from_millis),
            output: self.output,
        };
        (config, opts)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), SimError> {
    let (config, opts) = cli.into_parts();
    let ctx = EnsembleContext::from_options(config, &opts)?;
    info!(
        "R={} steps={} h={} scheme={} backend={:?}",
        ctx.config.replicates, ctx.config.steps, ctx.config.step_size, ctx.scheme, opts.backend
    );
    let mean = match opts.backend {
        Backend::Serial => ctx.run(&SerialComm::new())?,
        Backend::Threads => run_threads(&ctx, &opts)?,
        Backend::Mpi => run_mpi(&ctx)?,
    };
    if let Some(mean) = mean {
        mean.write(&opts.output)?;
        info!("wrote {} samples to {}", mean.len(), opts.output.display());
    }
    Ok(())
}

#[cfg(feature = "rayon")]
fn default_workers() -> usize {
    mcdamp::parallel::ThreadWorld::with_available_cpus().size()
}

#[cfg(not(feature = "rayon"))]
fn default_workers() -> usize {
    1
}

#[cfg(feature = "rayon")]
fn run_threads(ctx: &EnsembleContext, opts: &RunOptions) -> Result<Option<MeanTrajectory>, SimError> {
    let world = mcdamp::parallel::ThreadWorld::new(opts.workers)?
        .with_timeout(opts.timeout)
        .with_strategy(opts.reduce);
    ctx.run_threads(&world).map(Some)
}

#[cfg(not(feature = "rayon"))]
fn run_threads(_ctx: &EnsembleContext, _opts: &RunOptions) -> Result<Option<MeanTrajectory>, SimError> {
    Err(SimError::Config("built without the `rayon` feature; use --backend serial".into()))
}

#[cfg(feature = "mpi")]
fn run_mpi(ctx: &EnsembleContext) -> Result<Option<MeanTrajectory>, SimError> {
    let comm = mcdamp::parallel::MpiComm::new()?;
    ctx.run(&comm)
}

#[cfg(not(feature = "mpi"))]
fn run_mpi(_ctx: &EnsembleContext) -> Result<Option<MeanTrajectory>, SimError> {
    Err(SimError::Config("built without the `mpi` feature".into()))
}
