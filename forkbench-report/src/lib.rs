#![warn(missing_docs)]
//! forkbench Report - Reporting
//!
//! Generates output formats for a finished run:
//! - Human-readable terminal text
//! - JSON (machine-readable)

mod human;
mod json;
mod report;

use std::time::Duration;

pub use human::format_human_output;
pub use json::generate_json_report;
pub use report::{REPORT_SCHEMA_VERSION, Report, ReportEntry, ReportMeta, build_report};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Human,
    /// JSON with full schema
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Format a duration with a unit fitting its magnitude
pub fn format_duration(duration: Duration) -> String {
    format_nanos(duration.as_nanos() as f64)
}

/// Format a nanosecond quantity with a unit fitting its magnitude
pub fn format_nanos(ns: f64) -> String {
    if ns < 1_000.0 {
        format!("{:.2} ns", ns)
    } else if ns < 1_000_000.0 {
        format!("{:.2} µs", ns / 1_000.0)
    } else if ns < 1_000_000_000.0 {
        format!("{:.2} ms", ns / 1_000_000.0)
    } else if ns < 60_000_000_000.0 {
        format!("{:.2} s", ns / 1_000_000_000.0)
    } else {
        let secs = (ns / 1_000_000_000.0) as u64;
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
