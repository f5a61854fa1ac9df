/// Fixed bound for counts too small for the asymptotic formula.
/// [2, 15] holds six primes, one more than the largest count it serves.
pub const SMALL_BOUND: usize = 15;

/// Counts below this use `SMALL_BOUND`.
pub const ASYMPTOTIC_MIN_COUNT: usize = 6;

/// Estimate an upper bound believed to contain at least `n` primes.
///
/// Uses p_n < n (ln n + ln ln n), valid for n >= 6 (Rosser & Schoenfeld),
/// plus a margin of 10% of the estimate or 10, whichever is larger.
/// Saturates at `usize::MAX` for counts beyond the machine range.
pub fn estimate_max_n(n: usize) -> usize {
    if n < ASYMPTOTIC_MIN_COUNT {
        return SMALL_BOUND;
    }

    let nf = n as f64;
    let approx = nf * (nf.ln() + nf.ln().ln());
    let margin = (approx * 0.1).max(10.0);

    // `as` saturates on out-of-range floats
    (approx + margin).floor() as usize
}

/// Next bound to try after `max_n` held too few primes.
pub fn enlarge(max_n: usize) -> usize {
    max_n.saturating_mul(2).max(SMALL_BOUND)
}
