#![warn(missing_docs)]
//! forkbench Core - Data Model
//!
//! This crate provides the types a benchmark run is built from:
//! - [`BenchmarkDefinition`]: one experiment with a sync or async payload and lifecycle hooks
//! - [`BenchmarkOptions`]: warmup / iterations / timeout with documented defaults
//! - [`TimedResult`] and [`ResultMap`]: per-benchmark measurements keyed by definition index
//! - [`Clock`]: the monotonic timing capability consumed by the engine

mod definition;
mod measure;
mod result;

use std::any::Any;

pub use definition::{
    AsyncPayload, BenchmarkDefinition, BenchmarkKind, BenchmarkOptions, DEFAULT_ITERATIONS,
    DEFAULT_TIMEOUT, DEFAULT_WARMUP, Hook, Payload, SyncPayload, into_hook, run_hook,
};
pub use measure::{Clock, MonotonicClock, Timer};
pub use result::{ResultMap, TimedResult};

/// A value produced by a benchmark payload, with its concrete type erased
pub type Value = Box<dyn Any + Send + Sync>;

/// Display name for the benchmark at `index`: its identity, or `"benchmark {index + 1}"`
pub fn display_name(id: Option<&str>, index: usize) -> String {
    match id {
        Some(id) => id.to_string(),
        None => format!("benchmark {}", index + 1),
    }
}
