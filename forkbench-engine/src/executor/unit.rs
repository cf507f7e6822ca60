//! Per-Benchmark Unit of Work
//!
//! One unit runs per definition: set-up → warmup → timed iterations →
//! completion. Every await point races the run's cancellation token and the
//! benchmark's deadline through a [`Guard`].
//!
//! Synchronous payloads run on Tokio's blocking pool so they never hold an
//! async worker; the loop there checks the guard before each call, and a
//! call in progress is never interrupted.

use std::any::Any;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use forkbench_core::{AsyncPayload, BenchmarkDefinition, Clock, Payload, SyncPayload, TimedResult, Timer, Value};
use tokio::task::{JoinError, spawn_blocking};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{BenchmarkError, Phase};

type Measurements = (Vec<Duration>, Vec<Value>);

/// Cancellation and deadline state of one running benchmark
#[derive(Clone)]
pub(crate) struct Guard {
    name: String,
    token: CancellationToken,
    deadline: Option<Instant>,
    timeout: Duration,
}

impl Guard {
    /// Start guarding a benchmark; the deadline counts from now
    pub(crate) fn new(
        name: String,
        token: CancellationToken,
        timeout: Duration,
        enforce_timeout: bool,
    ) -> Self {
        let deadline = if enforce_timeout {
            Instant::now().checked_add(timeout)
        } else {
            None
        };
        Self {
            name,
            token,
            deadline,
            timeout,
        }
    }

    /// Drive `fut` unless the run is cancelled or the deadline passes first
    pub(crate) async fn race<T, F>(&self, fut: F) -> Result<T, BenchmarkError>
    where
        F: Future<Output = Result<T, BenchmarkError>>,
    {
        let deadline = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(self.cancelled()),
            () = deadline => Err(self.timed_out()),
            result = fut => result,
        }
    }

    /// [`Guard::race`] a fallible hook or payload step
    pub(crate) async fn run<T, F>(&self, phase: Phase, fut: F) -> Result<T, BenchmarkError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        self.race(async { fut.await.map_err(|source| self.failed(phase, source)) })
            .await
    }

    /// Fail if the run was cancelled or the deadline has passed
    pub(crate) fn check(&self) -> Result<(), BenchmarkError> {
        if self.token.is_cancelled() {
            return Err(self.cancelled());
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(self.timed_out()),
            _ => Ok(()),
        }
    }

    pub(crate) fn failed(&self, phase: Phase, source: anyhow::Error) -> BenchmarkError {
        BenchmarkError::Failed {
            name: self.name.clone(),
            phase,
            source,
        }
    }

    /// Map a blocking task that did not return
    fn join_failed(&self, err: JoinError) -> BenchmarkError {
        match err.try_into_panic() {
            Ok(panic) => BenchmarkError::Panicked {
                name: self.name.clone(),
                message: panic_message(panic.as_ref()),
            },
            Err(_) => self.cancelled(),
        }
    }

    fn cancelled(&self) -> BenchmarkError {
        BenchmarkError::Cancelled {
            name: self.name.clone(),
        }
    }

    fn timed_out(&self) -> BenchmarkError {
        warn!(benchmark = %self.name, timeout = ?self.timeout, "benchmark exceeded its timeout");
        BenchmarkError::TimedOut {
            name: self.name.clone(),
            timeout: self.timeout,
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Warmup and timed runs of a synchronous payload. Runs on a blocking thread.
fn measure_blocking<C: Clock>(
    payload: &SyncPayload,
    clock: &C,
    guard: &Guard,
    warmup: usize,
    runs: usize,
) -> Result<Measurements, BenchmarkError> {
    for _ in 0..warmup {
        guard.check()?;
        black_box(payload.call().map_err(|source| guard.failed(Phase::Warmup, source))?);
    }

    let mut times = Vec::with_capacity(runs);
    let mut results = Vec::with_capacity(runs);
    for n in 0..runs {
        guard.check()?;
        let timer = Timer::start(clock);
        let value = payload
            .call()
            .map_err(|source| guard.failed(Phase::Iteration(n), source))?;
        times.push(timer.stop());
        results.push(value);
    }
    Ok((times, results))
}

/// Warmup and timed runs of an asynchronous payload
async fn measure_async<C: Clock>(
    payload: &AsyncPayload,
    clock: &C,
    guard: &Guard,
    warmup: usize,
    runs: usize,
) -> Result<Measurements, BenchmarkError> {
    for _ in 0..warmup {
        guard.check()?;
        black_box(guard.run(Phase::Warmup, payload.call()).await?);
    }

    let mut times = Vec::with_capacity(runs);
    let mut results = Vec::with_capacity(runs);
    for n in 0..runs {
        guard.check()?;
        let timer = Timer::start(clock);
        let value = guard.run(Phase::Iteration(n), payload.call()).await?;
        times.push(timer.stop());
        results.push(value);
    }
    Ok((times, results))
}

/// Run one benchmark through its whole lifecycle.
///
/// Warmup only happens when more than one timed iteration is requested, and
/// the completion hook is not invoked for warmup runs.
pub(crate) async fn run_unit<C: Clock>(
    index: usize,
    definition: &BenchmarkDefinition,
    clock: &Arc<C>,
    guard: &Guard,
) -> Result<TimedResult, BenchmarkError> {
    let iterations = definition.iteration_count();
    debug!(index, benchmark = %guard.name, iterations, "setting up benchmark");
    guard.run(Phase::SetUp, definition.set_up()).await?;

    let warmup = if iterations > 1 { definition.warmup_count() } else { 0 };
    let runs = iterations.max(1);

    let (times, results) = match definition.payload() {
        Payload::Async(payload) => measure_async(payload, clock.as_ref(), guard, warmup, runs).await?,
        Payload::Sync(payload) => {
            let payload = payload.clone();
            let clock = Arc::clone(clock);
            let worker = guard.clone();
            let measured = spawn_blocking(move || {
                measure_blocking(&payload, clock.as_ref(), &worker, warmup, runs)
            });
            guard
                .race(async { measured.await.unwrap_or_else(|err| Err(guard.join_failed(err))) })
                .await?
        }
    };

    guard.run(Phase::Completion, definition.completion()).await?;
    debug!(index, benchmark = %guard.name, "benchmark completed");

    Ok(TimedResult::new(
        definition.id().map(str::to_owned),
        times,
        results,
    ))
}
