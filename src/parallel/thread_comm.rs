//! In-process worker world.
//!
//! `ThreadWorld` runs W workers on a dedicated rayon pool of exactly W
//! threads, so every worker can block in a collective without starving the
//! others. Each worker owns a `ThreadComm`: an inbox plus a sender to every
//! peer. Workers never share memory; partial sums move between them as
//! messages.
//!
//! Collectives:
//!
//! - `barrier`: every rank reports to rank 0, rank 0 releases everybody.
//! - `reduce_sum`, `ReduceStrategy::Tree`: binomial tree rooted at `root`,
//!   ⌈log₂ W⌉ rounds.
//! - `reduce_sum`, `ReduceStrategy::Linear`: `root` receives every partial
//!   sum in rank order.
//!
//! Both reductions add partial sums in a fixed order for a given W, so runs
//! are bit-reproducible.
//!
//! A worker that gives up (explicit `abort`, an error, or a panic that drops
//! its `ThreadComm` before its reduction completed) sends an abort message
//! to every peer; any peer blocked in, or later entering, a collective then
//! fails with `CommError::PeerAborted`. With a timeout configured, a peer
//! that is alive but never arrives yields `CommError::DeadlineExceeded`.

use std::cell::{Cell, RefCell};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::config::ReduceStrategy;
use crate::error::CommError;
use crate::parallel::{Comm, check_root};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Arrive,
    Release,
    Partial,
    Abort,
}

#[derive(Debug)]
struct Packet {
    tag: Tag,
    from: usize,
    payload: Vec<f64>,
}

/// One worker's endpoint in a [`ThreadWorld`].
pub struct ThreadComm {
    rank: usize,
    size: usize,
    peers: Vec<Sender<Packet>>,
    inbox: Receiver<Packet>,
    /// Packets that arrived before the collective waiting for them
    stash: RefCell<Vec<Packet>>,
    timeout: Option<Duration>,
    strategy: ReduceStrategy,
    /// Reduction finished or abort already announced
    settled: Cell<bool>,
}

impl ThreadComm {
    fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|t| Instant::now() + t)
    }

    fn send(&self, to: usize, tag: Tag, payload: Vec<f64>) -> Result<(), CommError> {
        self.peers[to]
            .send(Packet { tag, from: self.rank, payload })
            .map_err(|_| CommError::Disconnected { rank: self.rank, peer: to })
    }

    /// Wait for a packet with `tag` (from `from`, or from anyone).
    fn recv(
        &self,
        op: &'static str,
        tag: Tag,
        from: Option<usize>,
        deadline: Option<Instant>,
    ) -> Result<Packet, CommError> {
        let wanted = |p: &Packet| p.tag == tag && from.is_none_or(|f| p.from == f);
        {
            let mut stash = self.stash.borrow_mut();
            if let Some(p) = stash.iter().find(|p| p.tag == Tag::Abort) {
                return Err(CommError::PeerAborted { rank: self.rank, peer: p.from });
            }
            if let Some(i) = stash.iter().position(|p| wanted(p)) {
                return Ok(stash.remove(i));
            }
        }
        loop {
            let packet = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    match self.inbox.recv_timeout(left) {
                        Ok(p) => p,
                        Err(RecvTimeoutError::Timeout) => {
                            return Err(CommError::DeadlineExceeded {
                                op,
                                rank: self.rank,
                                timeout: self.timeout.unwrap_or_default(),
                            });
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            return Err(CommError::Disconnected {
                                rank: self.rank,
                                peer: from.unwrap_or(self.rank),
                            });
                        }
                    }
                }
                None => self.inbox.recv().map_err(|_| CommError::Disconnected {
                    rank: self.rank,
                    peer: from.unwrap_or(self.rank),
                })?,
            };
            if packet.tag == Tag::Abort {
                let peer = packet.from;
                self.stash.borrow_mut().push(packet);
                return Err(CommError::PeerAborted { rank: self.rank, peer });
            }
            if wanted(&packet) {
                return Ok(packet);
            }
            self.stash.borrow_mut().push(packet);
        }
    }

    fn accumulate(&self, acc: &mut [f64], packet: Packet) -> Result<(), CommError> {
        if packet.payload.len() != acc.len() {
            return Err(CommError::LengthMismatch {
                rank: self.rank,
                peer: packet.from,
                expected: acc.len(),
                found: packet.payload.len(),
            });
        }
        for (a, x) in acc.iter_mut().zip(&packet.payload) {
            *a += x;
        }
        Ok(())
    }

    fn reduce_linear(
        &self,
        local: &[f64],
        root: usize,
        deadline: Option<Instant>,
    ) -> Result<Option<Vec<f64>>, CommError> {
        if self.rank != root {
            self.send(root, Tag::Partial, local.to_vec())?;
            return Ok(None);
        }
        let mut acc = local.to_vec();
        for peer in (0..self.size).filter(|&p| p != root) {
            let packet = self.recv("reduce", Tag::Partial, Some(peer), deadline)?;
            self.accumulate(&mut acc, packet)?;
        }
        Ok(Some(acc))
    }

    fn reduce_tree(
        &self,
        local: &[f64],
        root: usize,
        deadline: Option<Instant>,
    ) -> Result<Option<Vec<f64>>, CommError> {
        let size = self.size;
        // position relative to the root, which sits at 0
        let rel = (self.rank + size - root) % size;
        let mut acc = local.to_vec();
        let mut mask = 1;
        while mask < size {
            if rel & mask != 0 {
                let parent = (rel - mask + root) % size;
                self.send(parent, Tag::Partial, acc)?;
                return Ok(None);
            }
            let child = rel + mask;
            if child < size {
                let peer = (child + root) % size;
                let packet = self.recv("reduce", Tag::Partial, Some(peer), deadline)?;
                self.accumulate(&mut acc, packet)?;
            }
            mask <<= 1;
        }
        Ok(Some(acc))
    }
}

impl Comm for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<(), CommError> {
        let deadline = self.deadline();
        if self.rank == 0 {
            for _ in 1..self.size {
                self.recv("barrier", Tag::Arrive, None, deadline)?;
            }
            for peer in 1..self.size {
                self.send(peer, Tag::Release, Vec::new())?;
            }
        } else {
            self.send(0, Tag::Arrive, Vec::new())?;
            self.recv("barrier", Tag::Release, Some(0), deadline)?;
        }
        Ok(())
    }

    fn reduce_sum(&self, local: &[f64], root: usize) -> Result<Option<Vec<f64>>, CommError> {
        check_root(root, self.size)?;
        let deadline = self.deadline();
        let out = match self.strategy {
            ReduceStrategy::Tree => self.reduce_tree(local, root, deadline),
            ReduceStrategy::Linear => self.reduce_linear(local, root, deadline),
        }?;
        self.settled.set(true);
        Ok(out)
    }

    fn abort(&self) {
        if self.settled.replace(true) {
            return;
        }
        warn!("rank {}: aborting, notifying {} peer(s)", self.rank, self.size - 1);
        for peer in (0..self.size).filter(|&p| p != self.rank) {
            // a peer that already left cannot be waiting on us
            let _ = self.send(peer, Tag::Abort, Vec::new());
        }
    }
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        if !self.settled.get() {
            self.abort();
        }
    }
}

/// Factory for a fixed-size world of thread workers.
#[derive(Debug, Clone)]
pub struct ThreadWorld {
    size: usize,
    timeout: Option<Duration>,
    strategy: ReduceStrategy,
}

impl ThreadWorld {
    pub fn new(size: usize) -> Result<Self, CommError> {
        if size == 0 {
            return Err(CommError::Launch("world size must be at least 1".into()));
        }
        Ok(Self { size, timeout: None, strategy: ReduceStrategy::Tree })
    }

    /// One worker per logical CPU.
    pub fn with_available_cpus() -> Self {
        Self { size: num_cpus::get().max(1), timeout: None, strategy: ReduceStrategy::Tree }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_strategy(mut self, strategy: ReduceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Wire up one endpoint per rank.
    pub fn communicators(&self) -> Vec<ThreadComm> {
        let (senders, inboxes): (Vec<_>, Vec<_>) = (0..self.size).map(|_| mpsc::channel()).unzip();
        inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| ThreadComm {
                rank,
                size: self.size,
                peers: senders.clone(),
                inbox,
                stash: RefCell::new(Vec::new()),
                timeout: self.timeout,
                strategy: self.strategy,
                settled: Cell::new(false),
            })
            .collect()
    }

    /// Run `f` once per rank, each on its own thread, and return the results
    /// in rank order.
    pub fn run<F, R>(&self, f: F) -> Result<Vec<R>, CommError>
    where
        F: Fn(ThreadComm) -> R + Sync,
        R: Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.size)
            .thread_name(|i| format!("mcdamp-worker-{i}"))
            .build()
            .map_err(|e| CommError::Launch(e.to_string()))?;
        debug!("launching {} thread worker(s), strategy {:?}", self.size, self.strategy);

        let comms = self.communicators();
        let (tx, rx) = mpsc::channel();
        pool.scope(|s| {
            for comm in comms {
                let tx = tx.clone();
                let f = &f;
                s.spawn(move |_| {
                    let rank = comm.rank();
                    let _ = tx.send((rank, f(comm)));
                });
            }
        });
        drop(tx);

        let mut results: Vec<(usize, R)> = rx.into_iter().collect();
        results.sort_by_key(|(rank, _)| *rank);
        Ok(results.into_iter().map(|(_, r)| r).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_and_sizes() {
        let world = ThreadWorld::new(3).unwrap();
        let ids = world.run(|comm| (comm.rank(), comm.size())).unwrap();
        assert_eq!(ids, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn empty_world_rejected() {
        assert!(ThreadWorld::new(0).is_err());
    }

    #[test]
    fn tree_reduce_to_nonzero_root() {
        let world = ThreadWorld::new(5).unwrap();
        let out = world
            .run(|comm| {
                comm.barrier()?;
                let local = vec![comm.rank() as f64, 1.0];
                comm.reduce_sum(&local, 3)
            })
            .unwrap();
        for (rank, r) in out.into_iter().enumerate() {
            let r = r.unwrap();
            if rank == 3 {
                assert_eq!(r, Some(vec![10.0, 5.0]));
            } else {
                assert_eq!(r, None);
            }
        }
    }

    #[test]
    fn length_mismatch_detected() {
        let world = ThreadWorld::new(2).unwrap().with_strategy(ReduceStrategy::Linear);
        let out = world
            .run(|comm| {
                let local = vec![1.0; 2 + comm.rank()];
                comm.reduce_sum(&local, 0)
            })
            .unwrap();
        assert!(matches!(out[0], Err(CommError::LengthMismatch { expected: 2, found: 3, .. })));
    }
}
