//! Summary Statistics
//!
//! Per-benchmark summaries over iteration times, in nanoseconds.
//!
//! Uses Rayon to summarize the benchmarks of a result map in parallel; each
//! benchmark's samples are processed independently.

use std::time::Duration;

use forkbench_core::ResultMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::percentiles::{Percentiles, interpolate, sorted};

/// Summary of one benchmark's iteration times (nanoseconds)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Median
    pub median: f64,
    /// Sample standard deviation (0 with fewer than two samples)
    pub std_dev: f64,
    /// Fastest iteration
    pub min: f64,
    /// Slowest iteration
    pub max: f64,
    /// Tail percentiles
    pub percentiles: Percentiles,
    /// Number of timed iterations
    pub sample_count: usize,
}

impl SummaryStatistics {
    /// Coefficient of variation in percent
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }

    /// Check if the timings look stable (CV below `cv_threshold` percent)
    pub fn is_stable(&self, cv_threshold: f64) -> bool {
        self.coefficient_of_variation() < cv_threshold
    }
}

/// Summarize a list of iteration times
pub fn compute_summary(times: &[Duration]) -> SummaryStatistics {
    if times.is_empty() {
        return SummaryStatistics::default();
    }

    let nanos: Vec<f64> = times.iter().map(|t| t.as_nanos() as f64).collect();
    let sorted = sorted(&nanos);
    let n = sorted.len();

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std_dev = if n < 2 {
        0.0
    } else {
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    };

    let percentiles = Percentiles {
        p50: interpolate(&sorted, 50.0),
        p90: interpolate(&sorted, 90.0),
        p95: interpolate(&sorted, 95.0),
        p99: interpolate(&sorted, 99.0),
    };

    SummaryStatistics {
        mean,
        median: percentiles.p50,
        std_dev,
        min: sorted[0],
        max: sorted[n - 1],
        percentiles,
        sample_count: n,
    }
}

/// Summarize every benchmark of a run (parallelized with Rayon).
///
/// Returned in index order.
pub fn compute_statistics(results: &ResultMap) -> Vec<(usize, SummaryStatistics)> {
    let entries: Vec<_> = results.iter().collect();
    entries
        .par_iter()
        .map(|(index, result)| (**index, compute_summary(result.times())))
        .collect()
}
