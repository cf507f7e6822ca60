//! Benchmark Collections
//!
//! [`Benchmarks`] is a named, ordered collection of definitions plus optional
//! collection-level hooks. Positions in the collection are the keys of the
//! result map a run produces.
//!
//! Collection hooks wrap the whole run: `set_up` before any benchmark is
//! scheduled, `on_completion` after every benchmark succeeded, `clean_up` at
//! the end of any run whose set-up succeeded.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use forkbench_core::{BenchmarkDefinition, Hook, ResultMap, into_hook, run_hook};
use futures::future::BoxFuture;

use crate::error::BenchmarksError;
use crate::executor::{ExecutionConfig, Executor, SettledMap};

/// A named, ordered collection of benchmark definitions
#[derive(Default)]
pub struct Benchmarks {
    id: Option<String>,
    definitions: Vec<Arc<BenchmarkDefinition>>,
    set_up: Option<Hook>,
    on_completion: Option<Hook>,
    clean_up: Option<Hook>,
}

impl Benchmarks {
    /// Collect definitions in order
    pub fn new(definitions: impl IntoIterator<Item = BenchmarkDefinition>) -> Self {
        definitions.into_iter().collect()
    }

    /// Attach a collection name
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a definition at the next position
    pub fn push(&mut self, definition: BenchmarkDefinition) {
        self.definitions.push(Arc::new(definition));
    }

    /// Hook run once before any benchmark is scheduled
    pub fn on_set_up<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.set_up = Some(into_hook(hook));
        self
    }

    /// Hook run once after every benchmark succeeded
    pub fn on_completion<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_completion = Some(into_hook(hook));
        self
    }

    /// Hook run once at the end of a run whose set-up succeeded
    pub fn on_clean_up<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.clean_up = Some(into_hook(hook));
        self
    }

    /// Collection name, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the collection has no definitions
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definition at `index`
    pub fn get(&self, index: usize) -> Option<&BenchmarkDefinition> {
        self.definitions.get(index).map(Arc::as_ref)
    }

    /// Iterate definitions in order
    pub fn iter(&self) -> impl Iterator<Item = &BenchmarkDefinition> {
        self.definitions.iter().map(Arc::as_ref)
    }

    pub(crate) fn shared(&self, index: usize) -> Arc<BenchmarkDefinition> {
        Arc::clone(&self.definitions[index])
    }

    pub(crate) fn definition(&self, index: usize) -> &BenchmarkDefinition {
        &self.definitions[index]
    }

    pub(crate) fn set_up(&self) -> BoxFuture<'static, anyhow::Result<()>> {
        run_hook(self.set_up.as_ref())
    }

    pub(crate) fn completion(&self) -> BoxFuture<'static, anyhow::Result<()>> {
        run_hook(self.on_completion.as_ref())
    }

    pub(crate) fn clean_up(&self) -> BoxFuture<'static, anyhow::Result<()>> {
        run_hook(self.clean_up.as_ref())
    }

    /// Run every benchmark with the default [`ExecutionConfig`].
    ///
    /// Fails fast: the first failing benchmark cancels the rest and no
    /// partial results are returned.
    pub async fn run(&self) -> Result<ResultMap, BenchmarksError> {
        Executor::new(ExecutionConfig::default()).run(self).await
    }

    /// Run every benchmark, capturing each one's outcome individually
    pub async fn run_settled(&self) -> Result<SettledMap, BenchmarksError> {
        Executor::new(ExecutionConfig::default())
            .run_settled(self)
            .await
    }
}

impl FromIterator<BenchmarkDefinition> for Benchmarks {
    fn from_iter<I: IntoIterator<Item = BenchmarkDefinition>>(iter: I) -> Self {
        Self {
            definitions: iter.into_iter().map(Arc::new).collect(),
            ..Self::default()
        }
    }
}

impl Extend<BenchmarkDefinition> for Benchmarks {
    fn extend<I: IntoIterator<Item = BenchmarkDefinition>>(&mut self, iter: I) {
        self.definitions.extend(iter.into_iter().map(Arc::new));
    }
}

impl fmt::Debug for Benchmarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Benchmarks")
            .field("id", &self.id)
            .field("definitions", &self.definitions)
            .field("set_up", &self.set_up.is_some())
            .field("on_completion", &self.on_completion.is_some())
            .field("clean_up", &self.clean_up.is_some())
            .finish()
    }
}
