//! Benchmark Executor
//!
//! Runs a benchmark collection concurrently and gathers one timed result per
//! definition.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Benchmarks (ordered BenchmarkDefinitions)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Validate, fork units, join, aggregate
//! └──────┬──────┘
//!        │  one task per definition
//!        ▼
//! ┌─────────────┐
//! │    unit     │  set-up → warmup → timed iterations → completion
//! └──────┬──────┘
//!        │  joined in completion order
//!        ▼
//! ┌─────────────┐
//! │  progress   │  Optional progress bar
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Fork-join coordination and failure policies
//! - `unit` - Lifecycle of a single benchmark
//! - `progress` - Terminal progress bar

mod execution;
mod progress;
mod unit;

// Re-export public API
pub use execution::{ExecutionConfig, Executor, SettledMap};
