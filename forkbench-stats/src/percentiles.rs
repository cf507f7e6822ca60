//! Percentile Computation
//!
//! Percentiles over raw nanosecond samples. Nothing is discarded: slow
//! iterations are the tail signal.

use serde::{Deserialize, Serialize};

/// Tail percentiles of one benchmark's iteration times, in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Percentiles {
    /// 50th percentile (median)
    pub p50: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

/// Compute a single percentile (0-100) from unsorted samples.
///
/// Uses linear interpolation between nearest ranks; an empty slice yields 0.
///
/// ```
/// # use forkbench_stats::compute_percentile;
/// let samples = [40.0, 10.0, 30.0, 20.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 25.0);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    interpolate(&sorted(samples), percentile)
}

/// Compute the standard percentiles, sorting only once
pub fn compute_percentiles(samples: &[f64]) -> Percentiles {
    let sorted = sorted(samples);
    Percentiles {
        p50: interpolate(&sorted, 50.0),
        p90: interpolate(&sorted, 90.0),
        p95: interpolate(&sorted, 95.0),
        p99: interpolate(&sorted, 99.0),
    }
}

pub(crate) fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// `sorted` must be ascending
pub(crate) fn interpolate(sorted: &[f64], percentile: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => *only,
        _ => {
            let last = sorted.len() - 1;
            let rank = (percentile.clamp(0.0, 100.0) / 100.0) * last as f64;
            let lower = rank.floor() as usize;
            let upper = (lower + 1).min(last);
            let fraction = rank - lower as f64;
            sorted[lower] + fraction * (sorted[upper] - sorted[lower])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_of_unsorted_input() {
        let samples = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        assert!((compute_percentile(&samples, 50.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_interpolates_between_ranks() {
        let samples: Vec<f64> = (0..=10).map(|x| x as f64 * 10.0).collect();
        // rank 0.95 * 10 = 9.5 -> halfway between 90 and 100
        assert!((compute_percentile(&samples, 95.0) - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_are_clamped() {
        let samples = vec![1.0, 2.0, 3.0];
        assert_eq!(compute_percentile(&samples, 0.0), 1.0);
        assert_eq!(compute_percentile(&samples, 100.0), 3.0);
        assert_eq!(compute_percentile(&samples, 250.0), 3.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(compute_percentile(&[], 50.0), 0.0);
        assert_eq!(compute_percentile(&[42.0], 99.0), 42.0);
        assert_eq!(compute_percentiles(&[]), Percentiles::default());
    }

    #[test]
    fn test_compute_all_percentiles() {
        let samples: Vec<f64> = (1..=100).rev().map(|x| x as f64).collect();
        let percentiles = compute_percentiles(&samples);

        assert!(percentiles.p50 > 49.0 && percentiles.p50 < 51.0);
        assert!(percentiles.p90 > 89.0 && percentiles.p90 < 91.0);
        assert!(percentiles.p99 > 98.0 && percentiles.p99 < 100.0);
    }
}
