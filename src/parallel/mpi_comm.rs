//! MPI-based worker world.
//!
//! Each MPI process is one worker; rank and size come from
//! `MPI_COMM_WORLD`. The reduction is a single `MPI_Reduce` with `MPI_SUM`
//! to the root, so the MPI library picks the reduction tree. MPI collectives
//! have no deadline; a worker that fails locally calls `MPI_Abort`, which
//! tears down the whole job.
//!
//! # Example
//! ```no_run
//! # #[cfg(feature = "mpi")] {
//! use mcdamp::parallel::{Comm, MpiComm};
//! let comm = MpiComm::new().unwrap();
//! println!("Rank: {} / {}", comm.rank(), comm.size());
//! comm.barrier().unwrap();
//! # }
//! ```

#[cfg(feature = "mpi")]
use mpi::collective::SystemOperation;
#[cfg(feature = "mpi")]
use mpi::environment::Universe;
#[cfg(feature = "mpi")]
use mpi::topology::SimpleCommunicator;
#[cfg(feature = "mpi")]
use mpi::traits::*;

#[cfg(feature = "mpi")]
use crate::error::CommError;
#[cfg(feature = "mpi")]
use crate::parallel::check_root;

/// MPI communicator wrapper.
///
/// Keeps the `Universe` alive for as long as the communicator exists; MPI is
/// finalized when the `MpiComm` is dropped.
#[cfg(feature = "mpi")]
pub struct MpiComm {
    /// The MPI world communicator (all processes in the job).
    world: SimpleCommunicator,
    /// The rank (ID) of this process within the communicator.
    rank: usize,
    /// The total number of processes in the communicator.
    size: usize,
    // declared last so it drops after `world`
    _universe: Universe,
}

#[cfg(feature = "mpi")]
impl MpiComm {
    /// Initializes MPI and wraps `MPI_COMM_WORLD`.
    pub fn new() -> Result<Self, CommError> {
        let universe = mpi::initialize()
            .ok_or_else(|| CommError::Launch("MPI has already been initialized".into()))?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        Ok(MpiComm { world, rank, size, _universe: universe })
    }
}

#[cfg(feature = "mpi")]
impl super::Comm for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<(), CommError> {
        self.world.barrier();
        Ok(())
    }

    /// `MPI_Reduce(local, out, len, MPI_DOUBLE, MPI_SUM, root)`.
    fn reduce_sum(&self, local: &[f64], root: usize) -> Result<Option<Vec<f64>>, CommError> {
        check_root(root, self.size)?;
        let root_process = self.world.process_at_rank(root as i32);
        if self.rank == root {
            let mut out = vec![0.0; local.len()];
            root_process.reduce_into_root(local, &mut out[..], SystemOperation::sum());
            Ok(Some(out))
        } else {
            root_process.reduce_into(local, SystemOperation::sum());
            Ok(None)
        }
    }

    fn abort(&self) {
        log::error!("rank {}: aborting MPI job", self.rank);
        self.world.abort(1)
    }
}
