//! Human Output
//!
//! Terminal text for a finished run: the total and average time of every
//! benchmark, followed by its spread.

use std::fmt::Write;

use forkbench_core::ResultMap;
use forkbench_stats::compute_statistics;

use crate::{format_duration, format_nanos};

/// Format a run's results for terminal display, in index order
pub fn format_human_output(results: &ResultMap) -> String {
    let mut output = String::new();

    for (index, summary) in compute_statistics(results) {
        let Some(result) = results.get(&index) else {
            continue;
        };
        let title = result.display_name(index);

        let _ = writeln!(output, "time for {} was {}", title, format_duration(result.total()));
        let _ = writeln!(
            output,
            "average time for {} was {}",
            title,
            format_duration(result.average())
        );
        let _ = writeln!(
            output,
            "    median: {}  p95: {}  stddev: {}  iterations: {}",
            format_nanos(summary.median),
            format_nanos(summary.percentiles.p95),
            format_nanos(summary.std_dev),
            summary.sample_count
        );
    }

    output
}
