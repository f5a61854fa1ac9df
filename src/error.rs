use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SieveError {
    #[error("Prime count must be at least 1")]
    InvalidCount,

    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("Gap in block coverage: expected offset {expected}, found {found}")]
    PartitionGap { expected: usize, found: usize },

    #[error("Overlapping blocks: expected offset {expected}, found {found}")]
    PartitionOverlap { expected: usize, found: usize },

    #[error("Only {found} primes below {max_n}, {requested} were requested")]
    Insufficient {
        requested: usize,
        found: usize,
        max_n: usize,
    },

    #[error("Search range [0, {bound}] does not fit in a machine word")]
    BoundOverflow { bound: usize },

    #[error("Worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

pub type Result<T> = std::result::Result<T, SieveError>;

impl SieveError {
    /// Classify a block that starts at `found` where `expected` was due.
    pub fn misaligned(expected: usize, found: usize) -> Self {
        if found > expected {
            SieveError::PartitionGap { expected, found }
        } else {
            SieveError::PartitionOverlap { expected, found }
        }
    }
}
