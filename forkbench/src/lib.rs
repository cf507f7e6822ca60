#![warn(missing_docs)]
//! # forkbench
//!
//! Concurrent benchmark harness for Rust.
//!
//! - **Fork-join scheduling**: every benchmark of a collection runs as its own task
//! - **Lifecycle hooks**: set-up, completion and clean-up per benchmark and per collection
//! - **Warmup**: discarded priming runs before the timed iterations
//! - **Fail-fast**: the first failure cancels the rest; no partial results
//! - **Settled runs**: optionally capture every benchmark's outcome instead
//! - **Statistics and reports**: summaries, human-readable text and JSON
//!
//! ## Quick Start
//!
//! ```ignore
//! use forkbench::prelude::*;
//!
//! let benchmarks = Benchmarks::new([
//!     BenchmarkDefinition::measure(|| {
//!         let mut v: Vec<u32> = (0..10).rev().collect();
//!         v.sort();
//!         Ok(v)
//!     })
//!     .with_id("sort")
//!     .iterations(3),
//! ]);
//!
//! let results = benchmarks.run().await?;
//! print!("{}", format_human_output(&results));
//! ```
//!
//! ## Async Benchmarks
//!
//! ```ignore
//! BenchmarkDefinition::measure_async(|| async {
//!     tokio::time::sleep(Duration::from_millis(1)).await;
//!     Ok(())
//! })
//! .timeout(Duration::from_secs(1));
//! ```

// Re-export core types
pub use forkbench_core::{
    AsyncPayload, BenchmarkDefinition, BenchmarkKind, BenchmarkOptions, Clock, DEFAULT_ITERATIONS,
    DEFAULT_TIMEOUT, DEFAULT_WARMUP, Hook, MonotonicClock, Payload, ResultMap, SyncPayload,
    TimedResult, Timer, Value,
};

// Re-export the engine
pub use forkbench_engine::{
    BenchmarkError, Benchmarks, BenchmarksError, CONFIG_FILE, DefaultsConfig, ExecutionConfig,
    Executor, FailurePolicy, ForkConfig, HookKind, Phase, RunnerConfig, SettledMap,
    parse_duration,
};

// Re-export stats
pub use forkbench_stats::{Percentiles, SummaryStatistics, compute_statistics, compute_summary};

// Re-export reporting
pub use forkbench_report::{
    OutputFormat, Report, ReportEntry, build_report, format_duration, format_human_output,
    generate_json_report,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BenchmarkDefinition, BenchmarkOptions, Benchmarks, BenchmarksError, ExecutionConfig,
        Executor, ResultMap, TimedResult, format_human_output,
    };
    pub use std::time::Duration;
}
