//! Timing Capability
//!
//! The engine never reads the system clock directly. It consumes a [`Clock`]:
//! `start()` captures an opaque marker immediately before a payload call and
//! `elapsed()` reports the duration since that marker immediately after.
//!
//! [`MonotonicClock`] is the production implementation, backed by the
//! monotonic `std::time::Instant`. Tests substitute deterministic clocks.

use std::time::{Duration, Instant};

/// A monotonic time source consumed by the execution engine.
///
/// Implementations are shared between concurrently running benchmarks, so
/// they must be `Send + Sync`. A marker is only ever passed back to the clock
/// that produced it.
pub trait Clock: Send + Sync + 'static {
    /// Opaque start marker
    type Mark: Send;

    /// Capture a start marker
    fn start(&self) -> Self::Mark;

    /// Duration elapsed since `mark` was captured
    fn elapsed(&self, mark: &Self::Mark) -> Duration;
}

/// Wall-clock timing through the platform monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    type Mark = Instant;

    #[inline(always)]
    fn start(&self) -> Instant {
        Instant::now()
    }

    #[inline(always)]
    fn elapsed(&self, mark: &Instant) -> Duration {
        mark.elapsed()
    }
}

/// Timer for measuring a single iteration against any [`Clock`]
pub struct Timer<'c, C: Clock> {
    clock: &'c C,
    mark: C::Mark,
}

impl<'c, C: Clock> Timer<'c, C> {
    /// Start a new timer
    #[inline(always)]
    pub fn start(clock: &'c C) -> Self {
        let mark = clock.start();
        Self { clock, mark }
    }

    /// Stop the timer and return the elapsed duration
    #[inline(always)]
    pub fn stop(self) -> Duration {
        self.clock.elapsed(&self.mark)
    }
}
