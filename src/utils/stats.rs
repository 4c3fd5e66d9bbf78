//! Per-worker run statistics.

use std::ops::Range;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct RunStats {
    pub rank: usize,
    pub workers: usize,
    /// Global replicate indices this worker ran
    pub replicates: Range<usize>,
    pub steps: usize,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn local_replicates(&self) -> usize {
        self.replicates.len()
    }

    /// Fixed steps taken by this worker across all its replicates.
    pub fn integrator_steps(&self) -> usize {
        self.local_replicates() * self.steps.saturating_sub(1)
    }

    pub fn steps_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.integrator_steps() as f64 / secs } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_counts() {
        let stats = RunStats {
            rank: 1,
            workers: 4,
            replicates: 250..501,
            steps: 200,
            elapsed: Duration::from_millis(500),
        };
        assert_eq!(stats.local_replicates(), 251);
        assert_eq!(stats.integrator_steps(), 251 * 199);
        assert!((stats.steps_per_second() - 2.0 * 251.0 * 199.0).abs() < 1e-6);
    }
}
