//! Engine Errors
//!
//! Two layers: [`BenchmarkError`] describes why one benchmark's unit of work
//! failed, [`BenchmarksError`] is what a whole run reports to the caller.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Lifecycle step of a benchmark in which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The per-benchmark set-up hook
    SetUp,
    /// A discarded warmup run
    Warmup,
    /// The timed iteration with this 0-based index
    Iteration(usize),
    /// The per-benchmark completion hook
    Completion,
    /// The per-benchmark clean-up hook (run by the coordinator)
    CleanUp,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::SetUp => f.write_str("set-up"),
            Phase::Warmup => f.write_str("warmup"),
            Phase::Iteration(n) => write!(f, "iteration {n}"),
            Phase::Completion => f.write_str("completion"),
            Phase::CleanUp => f.write_str("clean-up"),
        }
    }
}

/// Collection-level hook identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// Runs once before any benchmark is scheduled
    SetUp,
    /// Runs once after every benchmark succeeded
    Completion,
    /// Runs once at the end of a run whose set-up succeeded
    CleanUp,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::SetUp => f.write_str("set-up"),
            HookKind::Completion => f.write_str("completion"),
            HookKind::CleanUp => f.write_str("clean-up"),
        }
    }
}

/// Failure of a single benchmark
#[derive(Debug, Error)]
pub enum BenchmarkError {
    /// A hook or the payload returned an error
    #[error("{name}: {phase} failed: {source}")]
    Failed {
        /// Display name of the benchmark
        name: String,
        /// Step that failed
        phase: Phase,
        /// Error returned by the hook or payload
        #[source]
        source: anyhow::Error,
    },

    /// The benchmark did not finish within its declared timeout
    #[error("{name}: exceeded timeout of {timeout:?}")]
    TimedOut {
        /// Display name of the benchmark
        name: String,
        /// Declared timeout
        timeout: Duration,
    },

    /// The benchmark was stopped because a sibling failed
    #[error("{name}: cancelled")]
    Cancelled {
        /// Display name of the benchmark
        name: String,
    },

    /// The benchmark panicked
    #[error("{name}: panicked: {message}")]
    Panicked {
        /// Display name of the benchmark
        name: String,
        /// Panic payload, when it was a string
        message: String,
    },
}

impl BenchmarkError {
    /// Display name of the benchmark that failed
    pub fn name(&self) -> &str {
        match self {
            BenchmarkError::Failed { name, .. }
            | BenchmarkError::TimedOut { name, .. }
            | BenchmarkError::Cancelled { name }
            | BenchmarkError::Panicked { name, .. } => name,
        }
    }

    /// Whether the benchmark ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, BenchmarkError::TimedOut { .. })
    }
}

/// Failure of a whole run
#[derive(Debug, Error)]
pub enum BenchmarksError {
    /// Nothing to run
    #[error("Benchmark collection is empty")]
    Empty,

    /// A definition declares zero timed iterations
    #[error("Benchmark #{} ({name}) must declare at least one iteration", .index + 1)]
    InvalidIterations {
        /// Zero-based position of the definition
        index: usize,
        /// Display name of the definition
        name: String,
    },

    /// A benchmark failed; the remaining ones were cancelled
    #[error("Benchmark #{} failed: {source}", .index + 1)]
    Benchmark {
        /// Zero-based position of the failing definition
        index: usize,
        /// Why it failed
        #[source]
        source: BenchmarkError,
    },

    /// A collection-level hook failed
    #[error("Collection {hook} hook failed: {source}")]
    Hook {
        /// Which hook failed
        hook: HookKind,
        /// Error returned by the hook
        #[source]
        source: anyhow::Error,
    },

    /// A benchmark task could not be joined
    #[error("Benchmark task failed to join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl BenchmarksError {
    /// The failing benchmark's index, if the error came from one
    pub fn benchmark_index(&self) -> Option<usize> {
        match self {
            BenchmarksError::InvalidIterations { index, .. }
            | BenchmarksError::Benchmark { index, .. } => Some(*index),
            _ => None,
        }
    }
}
