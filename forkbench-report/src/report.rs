//! Report Data Structures

use chrono::{DateTime, Utc};
use forkbench_core::ResultMap;
use forkbench_stats::{SummaryStatistics, compute_statistics};
use serde::{Deserialize, Serialize};

/// Version of the JSON layout below
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Complete benchmark report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// One entry per benchmark, in index order
    pub results: Vec<ReportEntry>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Layout version of the JSON report
    pub schema_version: u32,
    /// forkbench version that produced the report
    pub version: String,
    /// Collection name
    pub name: String,
    /// When the report was built
    pub timestamp: DateTime<Utc>,
}

/// Individual benchmark result in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Position of the definition in its collection
    pub index: usize,
    /// Benchmark id, if one was given
    pub id: Option<String>,
    /// `id`, or a positional name when the benchmark has none
    pub title: String,
    /// Number of timed iterations
    pub iterations: usize,
    /// Sum of all iteration times in nanoseconds
    pub total_ns: u64,
    /// Integer mean iteration time in nanoseconds
    pub average_ns: u64,
    /// Spread of the iteration times
    pub summary: SummaryStatistics,
}

/// Build a report from a successful run
pub fn build_report(results: &ResultMap, name: &str) -> Report {
    let stats = compute_statistics(results);

    let entries = stats
        .into_iter()
        .filter_map(|(index, summary)| {
            let result = results.get(&index)?;
            Some(ReportEntry {
                index,
                id: result.id().map(str::to_owned),
                title: result.display_name(index),
                iterations: result.len(),
                total_ns: saturating_nanos(result.total()),
                average_ns: saturating_nanos(result.average()),
                summary,
            })
        })
        .collect();

    Report {
        meta: ReportMeta {
            schema_version: REPORT_SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: name.to_string(),
            timestamp: Utc::now(),
        },
        results: entries,
    }
}

fn saturating_nanos(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
