//! Timed Results
//!
//! One [`TimedResult`] is produced per benchmark at the end of its timed
//! phase. It keeps the measured durations and the produced values as two
//! parallel sequences in iteration order. Aggregates are derived on demand.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::{Value, display_name};

/// Results of a run keyed by the 0-based position of each definition
pub type ResultMap = BTreeMap<usize, TimedResult>;

/// Measurements and produced values of one benchmark
pub struct TimedResult {
    id: Option<String>,
    times: Vec<Duration>,
    results: Vec<Value>,
}

impl TimedResult {
    /// Build a result from parallel sequences of durations and values.
    ///
    /// # Panics
    ///
    /// Panics if `times` and `results` differ in length.
    pub fn new(id: Option<String>, times: Vec<Duration>, results: Vec<Value>) -> Self {
        assert_eq!(
            times.len(),
            results.len(),
            "times and results must be recorded in lockstep"
        );
        Self { id, times, results }
    }

    /// Identity propagated from the definition
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Name to display for the result at `index`
    pub fn display_name(&self, index: usize) -> String {
        display_name(self.id(), index)
    }

    /// Elapsed duration of every timed iteration, in order
    pub fn times(&self) -> &[Duration] {
        &self.times
    }

    /// Value produced by every timed iteration, in order
    pub fn results(&self) -> &[Value] {
        &self.results
    }

    /// Produced value of iteration `index`, if it has type `T`
    pub fn result<T: 'static>(&self, index: usize) -> Option<&T> {
        self.results.get(index)?.downcast_ref::<T>()
    }

    /// Number of timed iterations recorded
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether no iterations were recorded
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sum of all recorded durations
    pub fn total(&self) -> Duration {
        self.times.iter().sum()
    }

    /// Total amortized over the number of recorded durations (zero when empty)
    pub fn average(&self) -> Duration {
        let total = self.total();
        match u32::try_from(self.times.len()) {
            Ok(0) => Duration::ZERO,
            Ok(count) => total / count,
            Err(_) => total.div_f64(self.times.len() as f64),
        }
    }
}

impl fmt::Debug for TimedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedResult")
            .field("id", &self.id)
            .field("times", &self.times)
            .field("results", &self.results.len())
            .finish()
    }
}
