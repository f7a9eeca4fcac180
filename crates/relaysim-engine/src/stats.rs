//! Run statistics.

use std::time::Duration;

/// How the last run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    /// The engine has not run yet.
    #[default]
    NeverRan,
    /// Converged: no dirty nets remained.
    Stable,
    /// The dirty set failed to shrink within the iteration cap.
    Oscillating,
    /// The wall-clock watchdog fired.
    TimedOut,
    /// Stopped by request before converging.
    Stopped,
}

/// Counters gathered across an engine run.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Loop iterations executed.
    pub iterations: u64,
    /// Component `evaluate` calls.
    pub components_evaluated: u64,
    /// Wall time spent inside the run loop.
    pub wall_time: Duration,
    /// Largest dirty-set size seen in one iteration.
    pub dirty_peak: usize,
    /// How the most recent run ended.
    pub outcome: Outcome,
}
