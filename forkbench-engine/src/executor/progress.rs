//! Progress Display
//!
//! Optional terminal progress bar advanced by the coordinator as benchmarks
//! are joined.

use indicatif::{ProgressBar, ProgressStyle};

pub(crate) struct Progress {
    bar: Option<ProgressBar>,
}

impl Progress {
    pub(crate) fn new(len: usize, enabled: bool) -> Self {
        if !enabled {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(len as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_message("Running benchmarks...");
        Self { bar: Some(bar) }
    }

    /// Record one joined benchmark
    pub(crate) fn advance(&self, name: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(name.to_string());
            bar.inc(1);
        }
    }

    pub(crate) fn finish(&self, message: &'static str) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(message);
        }
    }

    pub(crate) fn abandon(&self, message: &'static str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message);
        }
    }
}
