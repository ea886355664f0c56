use std::sync::Mutex;

use opine::assembly::{TaskRunner, TaskSpec};
use opine::errors::{OpineError, Result};
use opine::task::ActionFuture;
use opine::watch::WatchTarget;

/// A fake task runner that:
/// - records every installed task, started task and watch binding
/// - never runs anything on its own; tests drive actions through
///   [`FakeRunner::run`].
#[derive(Default)]
pub struct FakeRunner {
    installed: Mutex<Vec<TaskSpec>>,
    started: Mutex<Vec<String>>,
    watched: Mutex<Vec<(String, WatchTarget)>>,
    reject: Option<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner whose `install` fails for the task called `name`.
    pub fn rejecting(name: &str) -> Self {
        Self {
            reject: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Names of installed tasks, in installation order.
    pub fn installed_names(&self) -> Vec<String> {
        self.installed
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.name.clone())
            .collect()
    }

    pub fn installed(&self, name: &str) -> Option<TaskSpec> {
        self.installed
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.name == name)
            .cloned()
    }

    pub fn prerequisites_of(&self, name: &str) -> Vec<String> {
        self.installed(name)
            .map(|t| t.prerequisites)
            .unwrap_or_default()
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    /// `(pattern, target description)` pairs in the order they were installed.
    pub fn watched(&self) -> Vec<(String, String)> {
        self.watched
            .lock()
            .unwrap()
            .iter()
            .map(|(p, t)| (p.clone(), t.describe()))
            .collect()
    }

    pub fn watch_targets(&self) -> Vec<WatchTarget> {
        self.watched
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    /// Run the action of an installed task.
    pub fn run(&self, name: &str) -> ActionFuture {
        let task = self
            .installed(name)
            .unwrap_or_else(|| panic!("task '{name}' was never installed"));
        task.action.run()
    }
}

impl TaskRunner for FakeRunner {
    fn install(&self, task: TaskSpec) -> Result<()> {
        if self.reject.as_deref() == Some(task.name.as_str()) {
            return Err(OpineError::RunnerError(format!(
                "refusing to install '{}'",
                task.name
            )));
        }
        self.installed.lock().unwrap().push(task);
        Ok(())
    }

    fn start(&self, task: &str) -> Result<()> {
        self.started.lock().unwrap().push(task.to_string());
        Ok(())
    }

    fn watch(&self, pattern: &str, target: WatchTarget) -> Result<()> {
        self.watched
            .lock()
            .unwrap()
            .push((pattern.to_string(), target));
        Ok(())
    }
}
