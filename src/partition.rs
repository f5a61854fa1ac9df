use std::sync::Arc;

use crate::error::{Result, SieveError};

/// Half-open interval [start, end) of the search line, sieved by one worker.
#[derive(Clone, Debug)]
pub struct Block {
    pub id: usize,
    pub start: usize,
    pub end: usize,
    pub base_primes: Arc<[usize]>,
}

impl Block {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split [0, max_n] into `worker_count` contiguous blocks
///
/// Every block is `max_n / worker_count` wide except the last, which runs
/// to `max_n + 1` so that `max_n` itself is covered. Blocks come back in
/// ascending order with `id` equal to their position.
pub fn partition(
    max_n: usize,
    worker_count: usize,
    base_primes: Arc<[usize]>,
) -> Result<Vec<Block>> {
    if worker_count == 0 {
        return Err(SieveError::InvalidWorkerCount);
    }
    let total = max_n
        .checked_add(1)
        .ok_or(SieveError::BoundOverflow { bound: max_n })?;

    let chunk = max_n / worker_count;
    let blocks: Vec<Block> = (0..worker_count)
        .map(|i| Block {
            id: i,
            start: i * chunk,
            end: if i == worker_count - 1 {
                total
            } else {
                (i + 1) * chunk
            },
            base_primes: Arc::clone(&base_primes),
        })
        .collect();

    verify_exhaustive(&blocks, total)?;
    Ok(blocks)
}

/// Check that `blocks` tile [0, total) with no gap and no overlap.
pub fn verify_exhaustive(blocks: &[Block], total: usize) -> Result<()> {
    let mut expected = 0;
    for block in blocks {
        if block.start != expected {
            return Err(SieveError::misaligned(expected, block.start));
        }
        if block.end < block.start {
            return Err(SieveError::PartitionOverlap {
                expected: block.start,
                found: block.end,
            });
        }
        expected = block.end;
    }

    // Coverage must end exactly at `total`
    match expected.cmp(&total) {
        std::cmp::Ordering::Less => Err(SieveError::PartitionGap {
            expected: total,
            found: expected,
        }),
        std::cmp::Ordering::Greater => Err(SieveError::PartitionOverlap {
            expected: total,
            found: expected,
        }),
        std::cmp::Ordering::Equal => Ok(()),
    }
}
