//! Splitting the replicate budget across workers.
//!
//! Every worker gets ⌊R/W⌋ replicates; the `R mod W` highest ranks get one
//! more. Shares are contiguous in rank order, so worker `i` owns the global
//! replicate indices `local_range(R, W, i)`.

use std::ops::Range;

use crate::error::SimError;

/// Number of replicates run by worker `rank` out of `workers`.
pub fn local_count(total: usize, workers: usize, rank: usize) -> Result<usize, SimError> {
    check_topology(workers, rank)?;
    let base = total / workers;
    let extra = total % workers;
    Ok(if rank >= workers - extra { base + 1 } else { base })
}

/// Global replicate indices owned by worker `rank`.
pub fn local_range(total: usize, workers: usize, rank: usize) -> Result<Range<usize>, SimError> {
    check_topology(workers, rank)?;
    let base = total / workers;
    let extra = total % workers;
    // ranks below `first_big` hold `base`, the rest hold `base + 1`
    let first_big = workers - extra;
    let start = if rank <= first_big {
        rank * base
    } else {
        first_big * base + (rank - first_big) * (base + 1)
    };
    let len = if rank >= first_big { base + 1 } else { base };
    Ok(start..start + len)
}

/// All workers' counts, in rank order.
pub fn all_counts(total: usize, workers: usize) -> Result<Vec<usize>, SimError> {
    (0..workers).map(|rank| local_count(total, workers, rank)).collect()
}

fn check_topology(workers: usize, rank: usize) -> Result<(), SimError> {
    if workers == 0 {
        return Err(SimError::Config("worker count must be at least 1".into()));
    }
    if rank >= workers {
        return Err(SimError::Config(format!("rank {rank} outside a world of {workers} workers")));
    }
    Ok(())
}
