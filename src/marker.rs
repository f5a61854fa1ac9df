use crate::partition::Block;

/// Survivors of one block: `flags[j]` is true iff `start + j` is prime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockResult {
    pub id: usize,
    pub start: usize,
    pub flags: Vec<bool>,
}

impl BlockResult {
    pub fn end(&self) -> usize {
        self.start + self.flags.len()
    }

    /// Prime values held by this block, ascending.
    pub fn primes(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(offset, &prime)| if prime { Some(self.start + offset) } else { None })
    }
}

/// Mark the composites of one block
///
/// Segment step of the segmented Sieve of Eratosthenes.
/// - Memory: 1 byte per number in [start, end)
/// - Each base prime p marks its multiples from max(p*p, first multiple >= start)
/// - Base primes are ascending, so the first p with p*p >= end ends the loop
/// - 0 and 1 are cleared explicitly, the p*p rule never reaches them
/// - Reads only the block, safe to run on any number of threads at once
pub fn mark(block: &Block) -> BlockResult {
    let mut flags = vec![true; block.len()];

    for &p in block.base_primes.iter() {
        let square = match p.checked_mul(p) {
            Some(square) if square < block.end => square,
            _ => break,
        };

        let mut multiple = square.max(block.start.div_ceil(p) * p);
        while multiple < block.end {
            flags[multiple - block.start] = false;
            multiple += p;
        }
    }

    for value in block.start..block.end.min(2) {
        flags[value - block.start] = false;
    }

    BlockResult {
        id: block.id,
        start: block.start,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::base_primes;
    use crate::trial::is_prime;
    use std::sync::Arc;

    fn block(id: usize, start: usize, end: usize, max_n: usize) -> Block {
        Block {
            id,
            start,
            end,
            base_primes: Arc::from(base_primes(max_n)),
        }
    }

    #[test]
    fn first_block_excludes_zero_and_one() {
        let result = mark(&block(0, 0, 16, 15));
        assert_eq!(result.primes().collect::<Vec<_>>(), vec![2, 3, 5, 7, 11, 13]);
        assert!(!result.flags[0]);
        assert!(!result.flags[1]);
    }

    #[test]
    fn block_starting_at_one() {
        let result = mark(&block(0, 1, 12, 11));
        assert_eq!(result.primes().collect::<Vec<_>>(), vec![2, 3, 5, 7, 11]);
    }

    #[test]
    fn base_primes_inside_block_survive() {
        // 2, 3, 5, 7 are base primes for 100 and lie in the block
        let result = mark(&block(0, 0, 20, 100));
        assert_eq!(result.primes().collect::<Vec<_>>(), vec![2, 3, 5, 7, 11, 13, 17, 19]);
    }

    #[test]
    fn prime_on_block_boundary() {
        let max_n = 200;
        // 101 is the last value of one block, then the first of the next
        let left = mark(&block(0, 50, 102, max_n));
        assert_eq!(left.primes().last(), Some(101));
        let right = mark(&block(1, 101, 150, max_n));
        assert_eq!(right.primes().next(), Some(101));
        let after = mark(&block(2, 100, 150, max_n));
        assert_eq!(after.primes().next(), Some(101));
    }

    #[test]
    fn composite_square_of_largest_base_prime() {
        // 121 = 11 * 11, 11 is the largest base prime of 150
        let result = mark(&block(0, 120, 151, 150));
        assert!(!result.flags[1]);
        assert_eq!(result.primes().collect::<Vec<_>>(), vec![127, 131, 137, 139, 149]);
    }

    #[test]
    fn empty_block() {
        let result = mark(&block(3, 40, 40, 100));
        assert!(result.flags.is_empty());
        assert_eq!(result.end(), 40);
    }

    #[test]
    fn agrees_with_trial_division_on_offset_blocks() {
        let max_n = 10_000;
        for (start, end) in [(0, 1), (2, 3), (97, 1024), (4_999, 7_001), (9_000, 10_001)] {
            let result = mark(&block(0, start, end, max_n));
            let expected: Vec<usize> = (start..end).filter(|&v| is_prime(v)).collect();
            assert_eq!(result.primes().collect::<Vec<_>>(), expected, "[{}, {})", start, end);
        }
    }
}
