use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::base::base_primes;
use crate::bound;
use crate::error::{Result, SieveError};
use crate::marker::mark;
use crate::merge::Merger;
use crate::partition::{Block, partition};
use crate::pool::WorkerPool;

pub const DEFAULT_MAX_ATTEMPTS: usize = 4;

/// What to do when the search bound holds fewer primes than requested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shortfall {
    /// Double the bound and sieve again, up to the attempt limit.
    #[default]
    Retry,
    /// Fail with `SieveError::Insufficient`.
    Fail,
    /// Return the short list as is.
    Truncate,
}

/// Pipeline stages reported to a `StageHook`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Bound,
    BaseSieve,
    Partition,
    /// Parallel marking together with the ordered merge.
    Sieve,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Bound => "bound",
            Stage::BaseSieve => "base sieve",
            Stage::Partition => "partition",
            Stage::Sieve => "sieve",
        }
    }
}

/// Caller-supplied measurement hook, called as each stage completes.
pub trait StageHook {
    fn stage_finished(&mut self, stage: Stage, attempt: usize, elapsed: Duration);
}

impl StageHook for () {
    fn stage_finished(&mut self, _stage: Stage, _attempt: usize, _elapsed: Duration) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SieveConfig {
    workers: usize,
    shortfall: Shortfall,
    max_attempts: usize,
    initial_bound: Option<usize>,
}

impl SieveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn shortfall(mut self, shortfall: Shortfall) -> Self {
        self.shortfall = shortfall;
        self
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Search bound for the first attempt, in place of the estimate.
    pub fn initial_bound(mut self, max_n: usize) -> Self {
        self.initial_bound = Some(max_n);
        self
    }
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            workers: WorkerPool::with_available_parallelism().workers(),
            shortfall: Shortfall::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_bound: None,
        }
    }
}

/// Outcome of a sieve run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SieveRun {
    pub requested: usize,
    pub primes: Vec<usize>,
    /// Bound of the last attempt.
    pub max_n: usize,
    pub workers: usize,
    pub attempts: usize,
}

impl SieveRun {
    /// True when fewer primes than requested came back.
    pub fn is_short(&self) -> bool {
        self.primes.len() < self.requested
    }
}

/// Parallel segmented sieve for the first `n` primes
///
/// Estimate bound → base primes → partition → mark blocks in parallel →
/// merge in block order → truncate. The only state shared between workers
/// is the read-only list of base primes.
#[derive(Clone, Debug, Default)]
pub struct PrimeSieve {
    config: SieveConfig,
}

impl PrimeSieve {
    pub fn new(config: SieveConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, n: usize, hook: &mut dyn StageHook) -> Result<SieveRun> {
        if n == 0 {
            return Err(SieveError::InvalidCount);
        }
        let pool = WorkerPool::new(self.config.workers)?;
        let max_attempts = self.config.max_attempts.max(1);

        let mut max_n = match self.config.initial_bound {
            Some(max_n) => max_n,
            None => {
                let started = Instant::now();
                let max_n = bound::estimate_max_n(n);
                hook.stage_finished(Stage::Bound, 1, started.elapsed());
                max_n
            }
        };

        let mut attempt = 1;
        loop {
            if max_n == usize::MAX {
                return Err(SieveError::BoundOverflow { bound: max_n });
            }
            debug!("attempt {}: sieving [0, {}] for {} primes", attempt, max_n, n);

            let primes = sieve_once(n, max_n, &pool, attempt, hook)?;
            let found = primes.len();
            let run = SieveRun {
                requested: n,
                primes,
                max_n,
                workers: pool.workers(),
                attempts: attempt,
            };

            if !run.is_short() {
                info!(
                    "found {} primes below {} with {} workers ({} attempt(s))",
                    found, max_n, run.workers, attempt
                );
                return Ok(run);
            }

            let insufficient = SieveError::Insufficient {
                requested: n,
                found,
                max_n,
            };
            match self.config.shortfall {
                Shortfall::Truncate => {
                    warn!("{}, returning the short list", insufficient);
                    return Ok(run);
                }
                Shortfall::Fail => return Err(insufficient),
                Shortfall::Retry if attempt >= max_attempts => return Err(insufficient),
                Shortfall::Retry => {
                    let next = bound::enlarge(max_n);
                    warn!("{}, retrying with bound {}", insufficient, next);
                    max_n = next;
                    attempt += 1;
                }
            }
        }
    }
}

/// One pass of the pipeline over [0, max_n].
fn sieve_once(
    n: usize,
    max_n: usize,
    pool: &WorkerPool,
    attempt: usize,
    hook: &mut dyn StageHook,
) -> Result<Vec<usize>> {
    let started = Instant::now();
    let base: Arc<[usize]> = Arc::from(base_primes(max_n));
    hook.stage_finished(Stage::BaseSieve, attempt, started.elapsed());
    debug!("{} base primes up to {}", base.len(), max_n.isqrt());

    let started = Instant::now();
    let blocks = partition(max_n, pool.workers(), base)?;
    hook.stage_finished(Stage::Partition, attempt, started.elapsed());

    let started = Instant::now();
    let mut merger = Merger::new(n, max_n + 1);
    pool.scatter(
        blocks,
        |block: Block| mark(&block),
        |_, result| merger.push(result),
    )?;
    let primes = merger.finish()?;
    hook.stage_finished(Stage::Sieve, attempt, started.elapsed());

    Ok(primes)
}

/// First `n` primes with the default configuration.
pub fn first_n_primes(n: usize) -> Result<Vec<usize>> {
    Ok(PrimeSieve::default().run(n, &mut ())?.primes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        stages: Vec<(Stage, usize)>,
    }

    impl StageHook for Recorder {
        fn stage_finished(&mut self, stage: Stage, attempt: usize, _elapsed: Duration) {
            self.stages.push((stage, attempt));
        }
    }

    fn sieve(workers: usize) -> PrimeSieve {
        PrimeSieve::new(SieveConfig::new().workers(workers))
    }

    #[test]
    fn first_ten() {
        assert_eq!(
            first_n_primes(10).unwrap(),
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]
        );
    }

    #[test]
    fn zero_count_rejected() {
        assert_eq!(sieve(2).run(0, &mut ()).unwrap_err(), SieveError::InvalidCount);
    }

    #[test]
    fn zero_workers_rejected() {
        assert_eq!(
            sieve(0).run(5, &mut ()).unwrap_err(),
            SieveError::InvalidWorkerCount
        );
    }

    #[test]
    fn hook_sees_every_stage() {
        let mut recorder = Recorder::default();
        sieve(2).run(6, &mut recorder).unwrap();
        assert_eq!(
            recorder.stages,
            vec![
                (Stage::Bound, 1),
                (Stage::BaseSieve, 1),
                (Stage::Partition, 1),
                (Stage::Sieve, 1),
            ]
        );
    }

    #[test]
    fn short_bound_is_retried() {
        // [0, 20] holds 8 primes, [0, 40] holds 12
        let config = SieveConfig::new().workers(3).initial_bound(20);
        let mut recorder = Recorder::default();
        let run = PrimeSieve::new(config).run(10, &mut recorder).unwrap();
        assert_eq!(run.primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert_eq!(run.max_n, 40);
        assert_eq!(run.attempts, 2);
        assert!(!run.is_short());
        assert_eq!(recorder.stages.last(), Some(&(Stage::Sieve, 2)));
        assert!(!recorder.stages.contains(&(Stage::Bound, 1)));
    }

    #[test]
    fn short_bound_fails_when_strict() {
        let config = SieveConfig::new()
            .workers(3)
            .initial_bound(20)
            .shortfall(Shortfall::Fail);
        assert_eq!(
            PrimeSieve::new(config).run(10, &mut ()).unwrap_err(),
            SieveError::Insufficient {
                requested: 10,
                found: 8,
                max_n: 20
            }
        );
    }

    #[test]
    fn short_bound_truncates_when_asked() {
        let config = SieveConfig::new()
            .workers(3)
            .initial_bound(20)
            .shortfall(Shortfall::Truncate);
        let run = PrimeSieve::new(config).run(10, &mut ()).unwrap();
        assert_eq!(run.primes, vec![2, 3, 5, 7, 11, 13, 17, 19]);
        assert!(run.is_short());
    }

    #[test]
    fn retry_budget_is_bounded() {
        // 10 -> 20 -> 40, still short of 20 primes (40 holds 12)
        let config = SieveConfig::new()
            .workers(2)
            .initial_bound(10)
            .max_attempts(3);
        assert_eq!(
            PrimeSieve::new(config).run(20, &mut ()).unwrap_err(),
            SieveError::Insufficient {
                requested: 20,
                found: 12,
                max_n: 40
            }
        );
    }

    #[test]
    fn unrepresentable_bound_rejected() {
        let config = SieveConfig::new().workers(2).initial_bound(usize::MAX);
        assert_eq!(
            PrimeSieve::new(config).run(3, &mut ()).unwrap_err(),
            SieveError::BoundOverflow { bound: usize::MAX }
        );
    }
}
