use std::collections::BTreeMap;

use log::debug;

use crate::error::{Result, SieveError};
use crate::marker::BlockResult;

/// Reassembles block results into the flat sieve and collects its primes
///
/// Results may arrive in any order. Out-of-order results wait in a buffer
/// keyed by block id until every lower id has been merged, so only the
/// blocks ahead of the gap are held in memory.
pub struct Merger {
    wanted: usize,
    total: usize,
    next_id: usize,
    next_offset: usize,
    pending: BTreeMap<usize, BlockResult>,
    primes: Vec<usize>,
}

impl Merger {
    /// Collect up to `wanted` primes from results covering [0, total).
    pub fn new(wanted: usize, total: usize) -> Self {
        Self {
            wanted,
            total,
            next_id: 0,
            next_offset: 0,
            pending: BTreeMap::new(),
            primes: Vec::with_capacity(wanted.min(total)),
        }
    }

    /// Accept the result of block `result.id`, merging every block now in sequence.
    pub fn push(&mut self, result: BlockResult) -> Result<()> {
        if result.id < self.next_id || self.pending.contains_key(&result.id) {
            return Err(SieveError::PartitionOverlap {
                expected: self.next_offset,
                found: result.start,
            });
        }
        self.pending.insert(result.id, result);

        while let Some(result) = self.pending.remove(&self.next_id) {
            self.absorb(&result)?;
            self.next_id += 1;
        }

        if !self.pending.is_empty() {
            debug!(
                "{} block(s) waiting for block {}",
                self.pending.len(),
                self.next_id
            );
        }
        Ok(())
    }

    /// Append one result at the current end of the flat sieve.
    fn absorb(&mut self, result: &BlockResult) -> Result<()> {
        if result.start != self.next_offset {
            return Err(SieveError::misaligned(self.next_offset, result.start));
        }
        self.next_offset = result.end();

        let room = self.wanted - self.primes.len();
        self.primes
            .extend(result.primes().filter(|&value| value >= 2).take(room));
        Ok(())
    }

    pub fn primes_found(&self) -> usize {
        self.primes.len()
    }

    /// Check the sieve is complete and return its primes, ascending.
    ///
    /// Fewer than `wanted` primes is not an error here.
    pub fn finish(self) -> Result<Vec<usize>> {
        if let Some(result) = self.pending.values().next() {
            // A block id never arrived
            return Err(SieveError::PartitionGap {
                expected: self.next_offset,
                found: result.start,
            });
        }

        match self.next_offset.cmp(&self.total) {
            std::cmp::Ordering::Less => Err(SieveError::PartitionGap {
                expected: self.total,
                found: self.next_offset,
            }),
            std::cmp::Ordering::Greater => Err(SieveError::PartitionOverlap {
                expected: self.total,
                found: self.next_offset,
            }),
            std::cmp::Ordering::Equal => Ok(self.primes),
        }
    }
}

/// Concatenate block results in the given order and return the first `n` primes.
///
/// Results must be contiguous starting at 0. A sieve holding fewer than `n`
/// primes yields a shorter list.
pub fn extract(results: &[BlockResult], n: usize) -> Result<Vec<usize>> {
    let total = results.iter().map(|result| result.flags.len()).sum();
    let mut merger = Merger::new(n, total);
    for result in results {
        merger.absorb(result)?;
    }
    merger.finish()
}
