use std::sync::mpsc;
use std::thread;

use log::debug;

use crate::error::{Result, SieveError};

/// Worker count used when the host cannot report its parallelism.
pub const FALLBACK_WORKERS: usize = 4;

/// Fixed-size pool of scoped worker threads, live for one fan-out/fan-in round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(SieveError::InvalidWorkerCount);
        }
        Ok(Self { workers })
    }

    /// One worker per logical CPU.
    pub fn with_available_parallelism() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_WORKERS);
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `work` on every item in parallel and hand each result to `gather`
    ///
    /// - Item i goes to worker i % workers; with as many items as workers,
    ///   each worker runs exactly one item
    /// - `gather` runs on the calling thread, in completion order, with the
    ///   item's index so the caller can restore input order
    /// - Blocks until every worker has finished, threads are joined before return
    /// - A panicking worker fails the whole round with `WorkerPanicked`
    /// - An error from `gather` stops gathering; remaining results are dropped
    pub fn scatter<T, R, W, G>(&self, items: Vec<T>, work: W, mut gather: G) -> Result<()>
    where
        T: Send,
        R: Send,
        W: Fn(T) -> R + Sync,
        G: FnMut(usize, R) -> Result<()>,
    {
        let spawned = self.workers.min(items.len());
        if spawned == 0 {
            return Ok(());
        }

        // Round-robin the items over the workers
        let mut queues: Vec<Vec<(usize, T)>> = (0..spawned).map(|_| Vec::new()).collect();
        for (index, item) in items.into_iter().enumerate() {
            queues[index % spawned].push((index, item));
        }

        let (tx, rx) = mpsc::channel::<(usize, R)>();
        let work = &work;

        thread::scope(|scope| {
            let handles: Vec<_> = queues
                .into_iter()
                .enumerate()
                .map(|(worker_id, queue)| {
                    let tx = tx.clone();
                    scope.spawn(move || {
                        for (index, item) in queue {
                            debug!("worker {} picked up item {}", worker_id, index);
                            if tx.send((index, work(item))).is_err() {
                                return; // Receiver dropped, stop this worker
                            }
                        }
                    })
                })
                .collect();

            // Only worker clones keep the channel open now
            drop(tx);

            let mut outcome = Ok(());
            for (index, result) in rx.iter() {
                if let Err(e) = gather(index, result) {
                    outcome = Err(e);
                    break;
                }
            }
            drop(rx);

            let mut panicked = None;
            for (worker_id, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() && panicked.is_none() {
                    panicked = Some(worker_id);
                }
            }

            match panicked {
                Some(worker) => Err(SieveError::WorkerPanicked { worker }),
                None => outcome,
            }
        })
    }

    /// `scatter`, collecting results back into input order.
    pub fn map<T, R, W>(&self, items: Vec<T>, work: W) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        W: Fn(T) -> R + Sync,
    {
        let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
        self.scatter(items, work, |index, result| {
            slots[index] = Some(result);
            Ok(())
        })?;
        Ok(slots.into_iter().flatten().collect())
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::with_available_parallelism()
    }
}
