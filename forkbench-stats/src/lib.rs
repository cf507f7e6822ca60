#![warn(missing_docs)]
//! forkbench Statistics
//!
//! Summaries of per-iteration timings:
//! - Mean, median and sample standard deviation
//! - Percentiles by linear interpolation between nearest ranks
//! - Parallel per-benchmark computation over a whole result map

mod percentiles;
mod summary;

pub use percentiles::{Percentiles, compute_percentile, compute_percentiles};
pub use summary::{SummaryStatistics, compute_statistics, compute_summary};
