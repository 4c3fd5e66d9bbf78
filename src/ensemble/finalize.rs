//! Turning the coordinator's global sum into the mean trajectory.

use std::path::Path;

use crate::error::SimError;
use crate::io::trajectory::write_trajectory;

/// Mean displacement at each sample time.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanTrajectory {
    pub time: Vec<f64>,
    pub mean: Vec<f64>,
    /// Replicates behind each mean value
    pub replicates: usize,
}

impl MeanTrajectory {
    /// Divide the reduced sum by the total replicate count.
    pub fn from_global_sum(
        time: Vec<f64>,
        mut sum: Vec<f64>,
        replicates: usize,
    ) -> Result<Self, SimError> {
        if replicates == 0 {
            return Err(SimError::Config("cannot average zero replicates".into()));
        }
        if time.len() != sum.len() {
            return Err(SimError::Config(format!(
                "time vector has {} samples but the sum has {}",
                time.len(),
                sum.len()
            )));
        }
        let n = replicates as f64;
        for s in sum.iter_mut() {
            *s /= n;
        }
        Ok(Self { time, mean: sum, replicates })
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Persist as the two-column text format.
    pub fn write(&self, path: &Path) -> Result<(), SimError> {
        write_trajectory(path, &self.time, &self.mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divides_by_replicates() {
        let m = MeanTrajectory::from_global_sum(vec![0.0, 0.1], vec![4.0, -2.0], 4).unwrap();
        assert_eq!(m.mean, vec![1.0, -0.5]);
        assert_eq!(m.replicates, 4);
    }

    #[test]
    fn zero_replicates_is_an_error() {
        let r = MeanTrajectory::from_global_sum(vec![0.0], vec![0.0], 0);
        assert!(matches!(r, Err(SimError::Config(_))));
    }
}
