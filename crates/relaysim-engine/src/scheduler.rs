//! Execution modes for the two loop phases.
//!
//! Per-item work in this simulator is microseconds, while handing a task to
//! a pool costs tens of microseconds, so parallelism only pays off on large
//! circuits. The factory picks single-threaded below a component-count
//! threshold (default 2000) and a bounded rayon pool above it; either way
//! the phases stay barrier-separated, so results are identical.

use rayon::prelude::*;

/// Requested execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Pick by component count.
    #[default]
    Auto,
    SingleThreaded,
    Parallel,
}

/// Mode after resolving `Auto` against the circuit size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolvedMode {
    Single,
    Parallel,
}

impl ExecMode {
    pub(crate) fn resolve(self, component_count: usize, threshold: usize) -> ResolvedMode {
        match self {
            ExecMode::SingleThreaded => ResolvedMode::Single,
            ExecMode::Parallel => ResolvedMode::Parallel,
            ExecMode::Auto => {
                if component_count >= threshold {
                    ResolvedMode::Parallel
                } else {
                    ResolvedMode::Single
                }
            }
        }
    }
}

/// Runs one phase's independent work items, serially or on a bounded pool.
#[derive(Debug)]
pub(crate) struct Scheduler {
    pool: Option<rayon::ThreadPool>,
}

impl Scheduler {
    pub fn new(mode: ResolvedMode, workers: usize) -> Self {
        let pool = match mode {
            ResolvedMode::Single => None,
            ResolvedMode::Parallel => rayon::ThreadPoolBuilder::new()
                .num_threads(workers.max(1))
                .build()
                .map_err(|e| {
                    log::warn!("thread pool unavailable ({e}); falling back to single-threaded");
                })
                .ok(),
        };
        Self { pool }
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Map `items` through `work`, preserving order. `work` must be pure
    /// with respect to shared state; mutation happens after the barrier.
    pub fn run<T, R, F>(&self, items: Vec<T>, work: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.into_par_iter().map(&work).collect()),
            None => items.into_iter().map(work).collect(),
        }
    }
}
