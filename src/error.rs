use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// Unified error type for mcdamp

#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("worker {rank}: integration failed at step {step} (t = {time}): {source}")]
    Integration {
        rank: usize,
        step: usize,
        time: f64,
        #[source]
        source: StepError,
    },
    #[error("collective failed: {0}")]
    Collective(#[from] CommError),
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed trajectory {}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl SimError {
    /// Process exit code for the `mcdamp` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            SimError::Config(_) => 2,
            SimError::Integration { .. } => 3,
            SimError::Collective(_) => 4,
            SimError::Io { .. } | SimError::Parse { .. } => 5,
        }
    }

    /// True when this error only reports that some *other* worker failed.
    pub fn is_secondary(&self) -> bool {
        matches!(
            self,
            SimError::Collective(CommError::PeerAborted { .. })
                | SimError::Collective(CommError::Disconnected { .. })
        )
    }
}

/// Failure of a single fixed step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("step size {0} is not finite and positive")]
    InvalidStepSize(f64),
    #[error("state has {found} components, system expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("state diverged (non-finite component {index})")]
    NonFinite { index: usize },
}

/// Failure of a collective operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommError {
    #[error("rank {rank}: {op} did not complete within {timeout:?}")]
    DeadlineExceeded {
        op: &'static str,
        rank: usize,
        timeout: Duration,
    },
    #[error("rank {rank}: peer {peer} aborted the run")]
    PeerAborted { rank: usize, peer: usize },
    #[error("rank {rank}: peer {peer} is gone")]
    Disconnected { rank: usize, peer: usize },
    #[error("rank {rank}: contribution from {peer} has length {found}, expected {expected}")]
    LengthMismatch {
        rank: usize,
        peer: usize,
        expected: usize,
        found: usize,
    },
    #[error("root {root} is outside a world of size {size}")]
    InvalidRoot { root: usize, size: usize },
    #[error("could not launch workers: {0}")]
    Launch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_kind() {
        assert_eq!(SimError::Config("x".into()).exit_code(), 2);
        let e = SimError::Integration { rank: 0, step: 3, time: 0.03, source: StepError::NonFinite { index: 0 } };
        assert_eq!(e.exit_code(), 3);
        let e: SimError = CommError::PeerAborted { rank: 1, peer: 0 }.into();
        assert_eq!(e.exit_code(), 4);
        assert!(e.is_secondary());
        let e = SimError::Parse { path: PathBuf::from("a.dat"), line: 2, reason: "x".into() };
        assert_eq!(e.exit_code(), 5);
        assert!(!e.is_secondary());
    }
}
