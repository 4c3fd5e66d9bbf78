//! Monte-Carlo ensemble pieces: partitioning, sampling, per-replicate
//! integration, local accumulation and the final mean.

pub mod accumulator;
pub mod finalize;
pub mod partition;
pub mod replicate;
pub mod sampler;

pub use accumulator::LocalAccumulator;
pub use finalize::MeanTrajectory;
pub use partition::{local_count, local_range};
pub use replicate::{ReplicateSimulator, time_vector};
pub use sampler::{DampingSampler, worker_rng};
