/// Size of the base sieve for a search bound: floor(sqrt(max_n)) + 1.
pub fn base_limit(max_n: usize) -> usize {
    max_n.isqrt() + 1
}

/// Base primes for segmented sieving up to `max_n`
///
/// Classic Sieve of Eratosthenes over [0, floor(sqrt(max_n)) + 1).
/// - Time complexity: O(l log log l) with l = sqrt(max_n)
/// - Space complexity: O(l) - 1 byte per number
/// - Marking starts at i*i, smaller multiples already have a smaller factor
pub fn base_primes(max_n: usize) -> Vec<usize> {
    let limit = base_limit(max_n);

    let mut is_prime = vec![true; limit];
    for flag in is_prime.iter_mut().take(2) {
        *flag = false;
    }

    let mut primes = Vec::new();
    for i in 2..limit {
        if !is_prime[i] {
            continue;
        }
        primes.push(i);

        if i <= (limit - 1) / i {
            let mut j = i * i;
            while j < limit {
                is_prime[j] = false;
                j += i;
            }
        }
    }

    primes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::is_prime;

    #[test]
    fn base_primes_of_thirty() {
        assert_eq!(base_limit(30), 6);
        assert_eq!(base_primes(30), vec![2, 3, 5]);
    }

    #[test]
    fn tiny_bounds() {
        // limit 1 and 2: nothing to record
        assert!(base_primes(0).is_empty());
        assert!(base_primes(1).is_empty());
        assert!(base_primes(3).is_empty());
        // limit 3: only 2
        assert_eq!(base_primes(4), vec![2]);
        assert_eq!(base_primes(15), vec![2, 3]);
    }

    #[test]
    fn perfect_square_bound_includes_its_root() {
        // sqrt(49) = 7, limit 8
        assert_eq!(base_primes(49), vec![2, 3, 5, 7]);
        assert_eq!(base_primes(48), vec![2, 3, 5]);
    }

    #[test]
    fn matches_trial_division() {
        let max_n = 1_000_000;
        let expected: Vec<usize> = (0..base_limit(max_n)).filter(|&v| is_prime(v)).collect();
        assert_eq!(base_primes(max_n), expected);
    }
}
