//! Benchmark Definitions
//!
//! A [`BenchmarkDefinition`] describes one experiment: an optional identity,
//! warmup and iteration counts, a timeout, the payload to measure and three
//! optional lifecycle hooks. The payload is either a synchronous closure or a
//! closure returning a future; both variants share the same accessor and hook
//! surface, so a collection can hold a mix of them.
//!
//! Definitions are immutable once built and carry no validation: the engine
//! checks `iterations > 0` when a run is scheduled.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};

use crate::{Value, display_name};

/// Default number of discarded warmup runs
pub const DEFAULT_WARMUP: usize = 0;

/// Default number of timed iterations
pub const DEFAULT_ITERATIONS: usize = 10;

/// Default per-benchmark timeout (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Run-shape parameters for one benchmark.
///
/// Defaults: `warmup = 0`, `iterations = 10`, `timeout = 5s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkOptions {
    /// Discarded priming runs before timing starts
    pub warmup: usize,
    /// Timed runs; must be greater than zero
    pub iterations: usize,
    /// Deadline for the whole benchmark (set-up through completion)
    pub timeout: Duration,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self {
            warmup: DEFAULT_WARMUP,
            iterations: DEFAULT_ITERATIONS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BenchmarkOptions {
    /// Options with the documented defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the warmup count
    pub fn warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the timed iteration count
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fallible asynchronous lifecycle hook
pub type Hook = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Box an async closure into a [`Hook`]
pub fn into_hook<F, Fut>(hook: F) -> Hook
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move || hook().boxed())
}

/// Run an optional hook, treating a missing one as a no-op
pub fn run_hook(hook: Option<&Hook>) -> BoxFuture<'static, anyhow::Result<()>> {
    match hook {
        Some(hook) => hook(),
        None => future::ok(()).boxed(),
    }
}

/// Synchronous payload with its produced value erased
#[derive(Clone)]
pub struct SyncPayload(Arc<dyn Fn() -> anyhow::Result<Value> + Send + Sync>);

impl SyncPayload {
    /// Invoke the payload once
    #[inline]
    pub fn call(&self) -> anyhow::Result<Value> {
        (self.0)()
    }
}

/// Asynchronous payload with its produced value erased
pub struct AsyncPayload(Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>);

impl AsyncPayload {
    /// Create the future for one invocation
    #[inline]
    pub fn call(&self) -> BoxFuture<'static, anyhow::Result<Value>> {
        (self.0)()
    }
}

/// The two payload variants of a definition
pub enum Payload {
    /// Runs on a blocking thread; cannot be interrupted mid-call
    Sync(SyncPayload),
    /// Produces a future per invocation; observes cancellation at await points
    Async(AsyncPayload),
}

impl Payload {
    /// Which variant this is
    pub fn kind(&self) -> BenchmarkKind {
        match self {
            Payload::Sync(_) => BenchmarkKind::Sync,
            Payload::Async(_) => BenchmarkKind::Async,
        }
    }
}

/// Execution style of a benchmark payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkKind {
    /// Synchronous closure
    Sync,
    /// Closure returning a future
    Async,
}

#[derive(Default)]
struct Hooks {
    set_up: Option<Hook>,
    on_completion: Option<Hook>,
    clean_up: Option<Hook>,
}

/// An immutable description of one benchmark.
///
/// ```ignore
/// let def = BenchmarkDefinition::measure(|| Ok(expensive_operation()))
///     .with_id("expensive")
///     .warmup(2)
///     .iterations(100);
/// ```
pub struct BenchmarkDefinition {
    id: Option<String>,
    options: BenchmarkOptions,
    payload: Payload,
    hooks: Hooks,
}

impl BenchmarkDefinition {
    /// Define a benchmark over a synchronous closure
    pub fn measure<F, T>(perform: F) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        let payload = SyncPayload(Arc::new(move || perform().map(|v| Box::new(v) as Value)));
        Self::from_payload(Payload::Sync(payload))
    }

    /// Define a benchmark over a closure returning a future
    pub fn measure_async<F, Fut, T>(perform: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Any + Send + Sync,
    {
        let payload = AsyncPayload(Box::new(move || {
            perform()
                .map(|result| result.map(|v| Box::new(v) as Value))
                .boxed()
        }));
        Self::from_payload(Payload::Async(payload))
    }

    fn from_payload(payload: Payload) -> Self {
        Self {
            id: None,
            options: BenchmarkOptions::default(),
            payload,
            hooks: Hooks::default(),
        }
    }

    /// Attach an identity, used as the display name
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replace all run-shape options at once
    pub fn with_options(mut self, options: BenchmarkOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the warmup count
    pub fn warmup(mut self, warmup: usize) -> Self {
        self.options.warmup = warmup;
        self
    }

    /// Set the timed iteration count
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.options.iterations = iterations;
        self
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Hook run once before warmup
    pub fn on_set_up<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.set_up = Some(into_hook(hook));
        self
    }

    /// Hook run once after the timed phase
    pub fn on_completion<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.on_completion = Some(into_hook(hook));
        self
    }

    /// Hook run once by the coordinator after this benchmark has been joined
    pub fn on_clean_up<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.clean_up = Some(into_hook(hook));
        self
    }

    /// Identity, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Name to display for the definition at `index`
    pub fn display_name(&self, index: usize) -> String {
        display_name(self.id(), index)
    }

    /// Run-shape options
    pub fn options(&self) -> &BenchmarkOptions {
        &self.options
    }

    /// Warmup count
    pub fn warmup_count(&self) -> usize {
        self.options.warmup
    }

    /// Timed iteration count
    pub fn iteration_count(&self) -> usize {
        self.options.iterations
    }

    /// Declared timeout
    pub fn timeout_duration(&self) -> Duration {
        self.options.timeout
    }

    /// Payload variant
    pub fn kind(&self) -> BenchmarkKind {
        self.payload.kind()
    }

    /// The payload to measure
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Run the set-up hook
    pub fn set_up(&self) -> BoxFuture<'static, anyhow::Result<()>> {
        run_hook(self.hooks.set_up.as_ref())
    }

    /// Run the completion hook
    pub fn completion(&self) -> BoxFuture<'static, anyhow::Result<()>> {
        run_hook(self.hooks.on_completion.as_ref())
    }

    /// Run the clean-up hook
    pub fn clean_up(&self) -> BoxFuture<'static, anyhow::Result<()>> {
        run_hook(self.hooks.clean_up.as_ref())
    }
}

impl fmt::Debug for BenchmarkDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkDefinition")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("kind", &self.kind())
            .field("set_up", &self.hooks.set_up.is_some())
            .field("on_completion", &self.hooks.on_completion.is_some())
            .field("clean_up", &self.hooks.clean_up.is_some())
            .finish()
    }
}
