//! Per-worker running sum of displacement trajectories.

/// Elementwise sum of every trajectory a worker has produced.
///
/// Allocated fresh for each run; a worker with no replicates still owns one
/// (all zeros) and contributes it to the reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalAccumulator {
    sums: Vec<f64>,
    replicates: usize,
}

impl LocalAccumulator {
    pub fn new(steps: usize) -> Self {
        Self { sums: vec![0.0; steps], replicates: 0 }
    }

    /// Add one trajectory.
    pub fn add(&mut self, displacement: &[f64]) {
        assert_eq!(self.sums.len(), displacement.len(), "trajectory has incorrect length");
        for (s, &x) in self.sums.iter_mut().zip(displacement) {
            *s += x;
        }
        self.replicates += 1;
    }

    /// Number of trajectories added so far.
    pub fn replicates(&self) -> usize {
        self.replicates
    }

    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.sums
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let acc = LocalAccumulator::new(4);
        assert_eq!(acc.as_slice(), &[0.0; 4]);
        assert_eq!(acc.replicates(), 0);
    }

    #[test]
    fn adds_elementwise() {
        let mut acc = LocalAccumulator::new(3);
        acc.add(&[1.0, 2.0, 3.0]);
        acc.add(&[0.5, -2.0, 1.0]);
        assert_eq!(acc.as_slice(), &[1.5, 0.0, 4.0]);
        assert_eq!(acc.replicates(), 2);
    }

    #[test]
    fn order_of_addition_does_not_matter() {
        use crate::config::SimulationConfig;
        use crate::ensemble::ReplicateSimulator;
        use crate::integrator::Rk4;
        use rand::SeedableRng;
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;

        let cfg = SimulationConfig::default();
        let mut sim = ReplicateSimulator::new(&cfg, Rk4::new());
        let trajectories: Vec<Vec<f64>> =
            (0..50).map(|i| sim.run(800.0 + 8.0 * i as f64).unwrap()).collect();

        let sum_in = |order: &[usize]| {
            let mut acc = LocalAccumulator::new(cfg.steps);
            for &i in order {
                acc.add(&trajectories[i]);
            }
            acc
        };
        let forward: Vec<usize> = (0..50).collect();
        let reverse: Vec<usize> = forward.iter().rev().copied().collect();
        let mut shuffled = forward.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(17));

        let reference = sum_in(&forward);
        for order in [&reverse, &shuffled] {
            let other = sum_in(order);
            assert_eq!(other.replicates(), 50);
            for (a, b) in reference.as_slice().iter().zip(other.as_slice()) {
                let rel = (a - b).abs() / a.abs().max(1e-300);
                assert!(rel < 1e-9, "{} vs {} (rel {})", a, b, rel);
            }
        }
    }

    #[test]
    #[should_panic(expected = "incorrect length")]
    fn length_mismatch_panics() {
        let mut acc = LocalAccumulator::new(3);
        acc.add(&[1.0, 2.0]);
    }
}
