use std::sync::Arc;

use log::{debug, warn};

use crate::bound;
use crate::error::{Result, SieveError};
use crate::partition::{Block, partition};
use crate::pipeline::DEFAULT_MAX_ATTEMPTS;
use crate::pool::WorkerPool;

/// Trial division primality test
///
/// - Rejects values below 2
/// - 2 is the only even prime
/// - Tests odd divisors up to floor(sqrt(v))
pub fn is_prime(v: usize) -> bool {
    if v < 2 {
        return false;
    }
    if v == 2 {
        return true;
    }
    if v % 2 == 0 {
        return false;
    }

    let root = v.isqrt();
    let mut d = 3;
    while d <= root {
        if v % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Variation 1: test candidates from 2 upward until `n` primes are found.
pub fn first_n(n: usize) -> Result<Vec<usize>> {
    if n == 0 {
        return Err(SieveError::InvalidCount);
    }

    let mut primes = Vec::with_capacity(n);
    let mut candidate = 2;
    while primes.len() < n {
        if is_prime(candidate) {
            primes.push(candidate);
        }
        candidate += 1;
    }
    Ok(primes)
}

/// Position of the first entry that breaks "the first primes, in order", if any.
pub fn first_mismatch(primes: &[usize]) -> Option<usize> {
    let mut candidate = 2;
    for (position, &value) in primes.iter().enumerate() {
        while !is_prime(candidate) {
            candidate += 1;
        }
        if value != candidate {
            return Some(position);
        }
        candidate += 1;
    }
    None
}

/// Variation 2: trial division over a partitioned range, one block per worker
///
/// The range comes from the bound estimator; a range holding fewer than `n`
/// primes is retried with a doubled bound, at most `DEFAULT_MAX_ATTEMPTS` times.
pub fn first_n_parallel(n: usize, pool: &WorkerPool) -> Result<Vec<usize>> {
    first_n_parallel_from(n, pool, bound::estimate_max_n(n), DEFAULT_MAX_ATTEMPTS)
}

/// Variation 2 starting from a caller-chosen bound, with an attempt limit.
pub fn first_n_parallel_from(
    n: usize,
    pool: &WorkerPool,
    max_n: usize,
    max_attempts: usize,
) -> Result<Vec<usize>> {
    if n == 0 {
        return Err(SieveError::InvalidCount);
    }

    let max_attempts = max_attempts.max(1);
    let mut max_n = max_n;
    let mut attempt = 1;
    loop {
        if max_n == usize::MAX {
            return Err(SieveError::BoundOverflow { bound: max_n });
        }
        let blocks = partition(max_n, pool.workers(), Arc::from(Vec::new()))?;
        let parts = pool.map(blocks, |block: Block| {
            debug!("trial division over [{}, {})", block.start, block.end);
            (block.start..block.end)
                .filter(|&v| is_prime(v))
                .collect::<Vec<usize>>()
        })?;

        let mut primes: Vec<usize> = parts.into_iter().flatten().take(n).collect();
        if primes.len() == n {
            primes.shrink_to_fit();
            return Ok(primes);
        }

        let insufficient = SieveError::Insufficient {
            requested: n,
            found: primes.len(),
            max_n,
        };
        if attempt >= max_attempts {
            return Err(insufficient);
        }
        let next = bound::enlarge(max_n);
        warn!("{}, retrying with bound {}", insufficient, next);
        max_n = next;
        attempt += 1;
    }
}
