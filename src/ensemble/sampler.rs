//! Damping draws and per-worker random streams.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SimulationConfig;

/// Source of the damping coefficient for each replicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DampingSampler {
    /// `min + (max − min)·U`, U uniform in [0, 1)
    Uniform { min: f64, max: f64 },
    /// The same damping for every replicate
    Fixed(f64),
}

impl DampingSampler {
    pub fn from_config(config: &SimulationConfig, fixed: Option<f64>) -> Self {
        match fixed {
            Some(d) => DampingSampler::Fixed(d),
            None => DampingSampler::Uniform { min: config.damping_min, max: config.damping_max },
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            DampingSampler::Uniform { min, max } => {
                let u: f64 = rng.r#gen();
                min + (max - min) * u
            }
            DampingSampler::Fixed(d) => d,
        }
    }
}

/// Random stream of worker `rank` for a run seeded with `seed`.
///
/// All workers share the key and use their rank as the ChaCha stream id, so
/// draws never overlap between workers and the run is reproducible for a
/// given seed and worker count.
pub fn worker_rng(seed: u64, rank: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(rank as u64);
    rng
}
