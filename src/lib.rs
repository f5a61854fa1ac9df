//! First-N prime generation with a parallel segmented Sieve of Eratosthenes.
//!
//! The range [0, MAX_N] is sized from the count, split into one block per
//! worker, sieved in parallel against a shared list of base primes, and
//! merged back in block order.

pub mod base;
pub mod bound;
pub mod error;
pub mod marker;
pub mod merge;
pub mod partition;
pub mod pipeline;
pub mod pool;
pub mod storage;
pub mod trial;

pub use error::{Result, SieveError};
pub use pipeline::{
    PrimeSieve, Shortfall, SieveConfig, SieveRun, Stage, StageHook, first_n_primes,
};
pub use pool::WorkerPool;
