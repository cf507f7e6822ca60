//! Benchmark Execution
//!
//! Fork-join scheduling of a [`Benchmarks`] collection.
//!
//! ## Data Flow
//!
//! ```text
//! Benchmarks (ordered definitions + collection hooks)
//!        │  validate: non-empty, iterations > 0
//!        ▼
//!  collection set-up
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ JoinSet          │  one task per definition:
//! │  (fork)          │  set-up → warmup → timed iterations → completion
//! └────────┬─────────┘
//!          │  join in completion order
//!          ▼
//!  per-definition clean-up → insert under original index
//!          │
//!          ▼
//!  collection completion / clean-up → ResultMap
//! ```
//!
//! ## Failure Policies
//!
//! - [`Executor::run`] fails fast: the first failing benchmark cancels every
//!   other one and is the only error reported; no partial map is returned.
//! - [`Executor::run_settled`] captures each benchmark's outcome and lets
//!   siblings finish, so one timeout or failure only affects its own entry.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use forkbench_core::{BenchmarkDefinition, Clock, MonotonicClock, ResultMap, TimedResult};
use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::progress::Progress;
use super::unit::{Guard, panic_message, run_unit};
use crate::benchmarks::Benchmarks;
use crate::error::{BenchmarkError, BenchmarksError, HookKind, Phase};

/// Per-index outcomes of a run that isolates failures
pub type SettledMap = BTreeMap<usize, Result<TimedResult, BenchmarkError>>;

type UnitOutcome = (usize, Result<TimedResult, BenchmarkError>);

/// Configuration for benchmark execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Maximum number of benchmarks running at once (`None` = all at once)
    pub max_concurrency: Option<usize>,
    /// Fail benchmarks that exceed their declared timeout
    pub enforce_timeouts: bool,
    /// Render a progress bar while joining
    pub show_progress: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            enforce_timeouts: true,
            show_progress: false,
        }
    }
}

/// Runs benchmark collections concurrently and aggregates their results
pub struct Executor<C: Clock = MonotonicClock> {
    config: ExecutionConfig,
    clock: Arc<C>,
}

impl Executor {
    /// Create an executor timing with the monotonic clock
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            clock: Arc::new(MonotonicClock),
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ExecutionConfig::default())
    }
}

impl<C: Clock> Executor<C> {
    /// Replace the clock used to time iterations
    pub fn with_clock<D: Clock>(self, clock: D) -> Executor<D> {
        Executor {
            config: self.config,
            clock: Arc::new(clock),
        }
    }

    /// Execution configuration
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run every benchmark, failing fast on the first error.
    ///
    /// On success the returned map holds exactly one entry per definition,
    /// keyed `0..benchmarks.len()`.
    pub async fn run(&self, benchmarks: &Benchmarks) -> Result<ResultMap, BenchmarksError> {
        self.wrapped(benchmarks, || self.join_fail_fast(benchmarks))
            .await
    }

    /// Run every benchmark to completion, capturing each outcome.
    ///
    /// Only precondition and collection-hook failures fail the whole call.
    pub async fn run_settled(
        &self,
        benchmarks: &Benchmarks,
    ) -> Result<SettledMap, BenchmarksError> {
        self.wrapped(benchmarks, || self.join_settled(benchmarks))
            .await
    }

    /// Validate, then surround `body` with the collection-level hooks
    async fn wrapped<T, F, Fut>(&self, benchmarks: &Benchmarks, body: F) -> Result<T, BenchmarksError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BenchmarksError>>,
    {
        validate(benchmarks)?;

        let collection = benchmarks.id().unwrap_or("benchmarks");
        info!(collection, benchmarks = benchmarks.len(), "running benchmarks");
        let start = Instant::now();

        benchmarks
            .set_up()
            .await
            .map_err(|source| BenchmarksError::Hook {
                hook: HookKind::SetUp,
                source,
            })?;

        let outcome = match body().await {
            Ok(value) => benchmarks
                .completion()
                .await
                .map(|()| value)
                .map_err(|source| BenchmarksError::Hook {
                    hook: HookKind::Completion,
                    source,
                }),
            Err(err) => Err(err),
        };

        let outcome = match (outcome, benchmarks.clean_up().await) {
            (Ok(_), Err(source)) => Err(BenchmarksError::Hook {
                hook: HookKind::CleanUp,
                source,
            }),
            (outcome, Err(source)) => {
                warn!(collection, error = %source, "collection clean-up failed after an earlier error");
                outcome
            }
            (outcome, Ok(())) => outcome,
        };

        match &outcome {
            Ok(_) => info!(collection, elapsed = ?start.elapsed(), "benchmarks finished"),
            Err(err) => warn!(collection, error = %err, "benchmark run failed"),
        }
        outcome
    }

    /// Fork one task per definition
    fn spawn_units(&self, benchmarks: &Benchmarks, token: &CancellationToken) -> JoinSet<UnitOutcome> {
        let limiter = self
            .config
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let enforce_timeouts = self.config.enforce_timeouts;
        let mut units = JoinSet::new();

        for index in 0..benchmarks.len() {
            let definition = benchmarks.shared(index);
            let clock = Arc::clone(&self.clock);
            let token = token.clone();
            let limiter = limiter.clone();

            units.spawn(async move {
                let name = definition.display_name(index);

                // The deadline starts once the benchmark is allowed to run
                let _permit = match limiter {
                    Some(limiter) => tokio::select! {
                        () = token.cancelled() => {
                            return (index, Err(BenchmarkError::Cancelled { name }));
                        }
                        permit = limiter.acquire_owned() => permit.ok(),
                    },
                    None => None,
                };

                let guard = Guard::new(
                    name.clone(),
                    token,
                    definition.timeout_duration(),
                    enforce_timeouts,
                );
                let outcome = AssertUnwindSafe(run_unit(index, &definition, &clock, &guard))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Err(BenchmarkError::Panicked {
                            name,
                            message: panic_message(panic.as_ref()),
                        })
                    });
                (index, outcome)
            });
        }

        units
    }

    async fn join_fail_fast(&self, benchmarks: &Benchmarks) -> Result<ResultMap, BenchmarksError> {
        let token = CancellationToken::new();
        let mut units = self.spawn_units(benchmarks, &token);
        let progress = Progress::new(benchmarks.len(), self.config.show_progress);
        let mut results = ResultMap::new();

        while let Some(joined) = units.join_next().await {
            let (index, outcome) = joined?;
            let outcome = match outcome {
                Ok(result) => clean_up(index, benchmarks.definition(index), result).await,
                Err(err) => Err(err),
            };

            match outcome {
                Ok(result) => {
                    progress.advance(&result.display_name(index));
                    results.insert(index, result);
                }
                Err(source) => {
                    warn!(index, error = %source, "benchmark failed, cancelling remaining benchmarks");
                    token.cancel();
                    units.shutdown().await;
                    progress.abandon("Failed");
                    return Err(BenchmarksError::Benchmark { index, source });
                }
            }
        }

        progress.finish("Complete");
        debug_assert!(results.keys().copied().eq(0..benchmarks.len()));
        Ok(results)
    }

    async fn join_settled(&self, benchmarks: &Benchmarks) -> Result<SettledMap, BenchmarksError> {
        // Never cancelled: a failing benchmark must not stop its siblings
        let token = CancellationToken::new();
        let mut units = self.spawn_units(benchmarks, &token);
        let progress = Progress::new(benchmarks.len(), self.config.show_progress);
        let mut outcomes = SettledMap::new();

        while let Some(joined) = units.join_next().await {
            let (index, outcome) = joined?;
            let definition = benchmarks.definition(index);
            let outcome = match outcome {
                Ok(result) => clean_up(index, definition, result).await,
                Err(err) => Err(err),
            };
            if let Err(err) = &outcome {
                warn!(index, error = %err, "benchmark failed");
            }

            progress.advance(&definition.display_name(index));
            outcomes.insert(index, outcome);
        }

        progress.finish("Complete");
        Ok(outcomes)
    }
}

/// Check preconditions before anything is scheduled
fn validate(benchmarks: &Benchmarks) -> Result<(), BenchmarksError> {
    if benchmarks.is_empty() {
        return Err(BenchmarksError::Empty);
    }

    let invalid = benchmarks
        .iter()
        .enumerate()
        .find(|(_, definition)| definition.iteration_count() == 0);
    match invalid {
        Some((index, definition)) => Err(BenchmarksError::InvalidIterations {
            index,
            name: definition.display_name(index),
        }),
        None => Ok(()),
    }
}

/// Run a joined benchmark's clean-up hook, passing its result through
async fn clean_up(
    index: usize,
    definition: &BenchmarkDefinition,
    result: TimedResult,
) -> Result<TimedResult, BenchmarkError> {
    debug!(index, benchmark = %definition.display_name(index), "cleaning up benchmark");
    definition
        .clean_up()
        .await
        .map(|()| result)
        .map_err(|source| BenchmarkError::Failed {
            name: definition.display_name(index),
            phase: Phase::CleanUp,
            source,
        })
}
