#![warn(missing_docs)]
//! forkbench Execution Engine
//!
//! Runs a [`Benchmarks`] collection as a fork-join: every definition runs as
//! its own task, results are joined in completion order and stored under the
//! definition's original index.
//!
//! # Example
//!
//! ```ignore
//! use forkbench_core::BenchmarkDefinition;
//! use forkbench_engine::Benchmarks;
//!
//! let benchmarks = Benchmarks::new([
//!     BenchmarkDefinition::measure(|| Ok((0..1000).sum::<u64>())).iterations(5),
//! ]);
//! let results = benchmarks.run().await?;
//! println!("{:?}", results[&0].average());
//! ```

mod benchmarks;
mod config;
mod error;
mod executor;

pub use benchmarks::Benchmarks;
pub use config::*;
pub use error::{BenchmarkError, BenchmarksError, HookKind, Phase};
pub use executor::{ExecutionConfig, Executor, SettledMap};
