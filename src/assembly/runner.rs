// src/assembly/runner.rs

//! Interface to the external task runner.
//!
//! opine never schedules or executes anything itself. After assembly it
//! installs `(name, prerequisites, action)` triples into a [`TaskRunner`];
//! the runner owns ordering, parallelism, file watching and cancellation.
//!
//! The runner is shared as `Arc<dyn TaskRunner>` because the `watch` and
//! `develop` actions call back into it (to start tasks and install
//! path-triggers) when the runner eventually executes them.

use crate::errors::Result;
use crate::task::TaskAction;
use crate::types::TaskName;
use crate::watch::WatchTarget;

/// A fully assembled task, ready to be installed.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: TaskName,
    pub prerequisites: Vec<TaskName>,
    pub action: TaskAction,
}

/// Trait abstracting the engine that actually runs tasks.
///
/// Production code plugs in whatever runner hosts the build; tests use a
/// recording fake.
pub trait TaskRunner: Send + Sync {
    /// Define a task. Prerequisite names are passed through unvalidated.
    fn install(&self, task: TaskSpec) -> Result<()>;

    /// Start the named task (and its prerequisites) without waiting for it.
    fn start(&self, task: &str) -> Result<()>;

    /// Run `target` whenever a path matching `pattern` changes.
    fn watch(&self, pattern: &str, target: WatchTarget) -> Result<()>;
}
