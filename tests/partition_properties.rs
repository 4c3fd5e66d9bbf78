//! Coverage and balance of the replicate partitioner.
//!
//! For every world size W ≥ 1 and replicate count R ≥ 0 the per-worker counts
//! must add up to R and differ by at most one, with the extra replicates on
//! the highest ranks.

use mcdamp::ensemble::partition::{all_counts, local_count, local_range};
use rand::Rng;

/// Checks the partition invariants for one (R, W) pair.
fn check(total: usize, workers: usize) {
    let counts = all_counts(total, workers).unwrap();
    assert_eq!(counts.iter().sum::<usize>(), total, "R={} W={}", total, workers);
    let min = *counts.iter().min().unwrap();
    let max = *counts.iter().max().unwrap();
    assert!(max - min <= 1, "R={} W={} counts={:?}", total, workers, counts);
    // non-decreasing in rank: the remainder sits on the highest ranks
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "counts={:?}", counts);

    let mut next = 0;
    for rank in 0..workers {
        let r = local_range(total, workers, rank).unwrap();
        assert_eq!(r.start, next, "gap or overlap before rank {}", rank);
        assert_eq!(r.len(), local_count(total, workers, rank).unwrap());
        next = r.end;
    }
    assert_eq!(next, total);
}

#[test]
fn exhaustive_small_worlds() {
    for workers in 1..=17 {
        for total in 0..=100 {
            check(total, workers);
        }
    }
}

#[test]
fn random_large_worlds() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let workers = rng.gen_range(1..=512);
        let total = rng.gen_range(0..=1_000_000);
        check(total, workers);
    }
}

#[test]
fn reference_cases() {
    assert_eq!(all_counts(1000, 4).unwrap(), vec![250, 250, 250, 250]);
    assert_eq!(all_counts(1001, 4).unwrap(), vec![250, 250, 250, 251]);
}

#[test]
fn single_worker_takes_everything() {
    assert_eq!(local_count(1000, 1, 0).unwrap(), 1000);
    assert_eq!(local_range(1000, 1, 0).unwrap(), 0..1000);
}
