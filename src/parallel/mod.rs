//! Worker topology and collectives.
//!
//! The ensemble driver only needs four things from its execution
//! environment: the world size, its own rank, a barrier and a sum-reduction
//! of a vector to one root. [`Comm`] captures exactly that. Backends:
//!
//! - [`SerialComm`]: a world of one.
//! - [`ThreadComm`] (feature `rayon`): one thread per worker, message passing
//!   over channels, optional deadline per collective.
//! - [`MpiComm`] (feature `mpi`): one MPI process per worker.
//!
//! Collectives are all-or-nothing: when a worker fails before taking part,
//! the others get an error instead of a partial sum.

use crate::error::CommError;

pub trait Comm {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Block until every worker has arrived.
    fn barrier(&self) -> Result<(), CommError>;

    /// Elementwise sum of every worker's `local` vector.
    ///
    /// Returns `Some(sum)` on `root` and `None` elsewhere.
    fn reduce_sum(&self, local: &[f64], root: usize) -> Result<Option<Vec<f64>>, CommError>;

    /// Tell the other workers this one will not take part in the remaining
    /// collectives.
    fn abort(&self) {}

    fn is_root(&self, root: usize) -> bool {
        self.rank() == root
    }
}

pub(crate) fn check_root(root: usize, size: usize) -> Result<(), CommError> {
    if root >= size {
        return Err(CommError::InvalidRoot { root, size });
    }
    Ok(())
}

/// A world containing only the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialComm;

impl SerialComm {
    pub fn new() -> Self {
        SerialComm
    }
}

impl Comm for SerialComm {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn barrier(&self) -> Result<(), CommError> {
        Ok(())
    }
    fn reduce_sum(&self, local: &[f64], root: usize) -> Result<Option<Vec<f64>>, CommError> {
        check_root(root, 1)?;
        Ok(Some(local.to_vec()))
    }
}

#[cfg(feature = "rayon")]
pub mod thread_comm;
#[cfg(feature = "rayon")]
pub use thread_comm::{ThreadComm, ThreadWorld};

#[cfg(feature = "mpi")]
pub mod mpi_comm;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;
