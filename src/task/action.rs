// src/task/action.rs

//! Executable steps attached to tasks and watch bindings.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::Result;

/// Boxed future returned by a [`TaskAction`].
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// A shareable, zero-argument async step.
///
/// The task runner decides when (and how often) to call it; cloning only
/// clones the handle.
#[derive(Clone)]
pub struct TaskAction {
    inner: Arc<dyn Fn() -> ActionFuture + Send + Sync>,
}

impl TaskAction {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move || Box::pin(f()) as ActionFuture),
        }
    }

    /// Wrap a synchronous closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::new(move || {
            let f = Arc::clone(&f);
            async move { f() }
        })
    }

    /// An action that does nothing.
    pub fn noop() -> Self {
        Self::new(|| async { Ok(()) })
    }

    /// Start one execution of the step.
    pub fn run(&self) -> ActionFuture {
        (self.inner)()
    }

    /// Whether two handles share the same underlying step.
    pub fn ptr_eq(&self, other: &TaskAction) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskAction").finish_non_exhaustive()
    }
}
