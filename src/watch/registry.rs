// src/watch/registry.rs

use tracing::debug;

use crate::task::TaskAction;
use crate::types::TaskName;

/// What a watch binding runs when its pattern fires.
#[derive(Debug, Clone)]
pub enum WatchTarget {
    /// Run the named task through the runner.
    Task(TaskName),
    /// Run this step directly.
    Inline(TaskAction),
}

impl WatchTarget {
    /// Short description for logs and plan output.
    pub fn describe(&self) -> String {
        match self {
            WatchTarget::Task(name) => name.clone(),
            WatchTarget::Inline(_) => "<inline step>".to_string(),
        }
    }
}

impl From<&str> for WatchTarget {
    fn from(name: &str) -> Self {
        WatchTarget::Task(name.to_string())
    }
}

impl From<String> for WatchTarget {
    fn from(name: String) -> Self {
        WatchTarget::Task(name)
    }
}

impl From<TaskAction> for WatchTarget {
    fn from(action: TaskAction) -> Self {
        WatchTarget::Inline(action)
    }
}

/// A path pattern and what to run when it changes.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    pub pattern: String,
    pub target: WatchTarget,
}

/// Append-only record of watch bindings and alt-watch tasks.
///
/// Task names are not checked against the registry; an unknown name is
/// passed through to the runner as-is.
#[derive(Debug, Clone, Default)]
pub struct WatchRegistry {
    bindings: Vec<WatchBinding>,
    alt_watch: Vec<TaskName>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `target` whenever a path matching `pattern` changes.
    pub fn add_watch(&mut self, pattern: impl Into<String>, target: impl Into<WatchTarget>) {
        let binding = WatchBinding {
            pattern: pattern.into(),
            target: target.into(),
        };
        debug!(
            pattern = %binding.pattern,
            target = %binding.target.describe(),
            "registering watch binding"
        );
        self.bindings.push(binding);
    }

    /// Start `task` directly when `watch` starts; it manages its own watching.
    pub fn add_alt_watch(&mut self, task: impl Into<TaskName>) {
        let task = task.into();
        debug!(task = %task, "registering alt-watch task");
        self.alt_watch.push(task);
    }

    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    pub fn alt_watch(&self) -> &[TaskName] {
        &self.alt_watch
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.alt_watch.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_keep_registration_order() {
        let mut watches = WatchRegistry::new();
        watches.add_watch("frontend/styles/**/*.scss", "styles");
        watches.add_watch("frontend/scripts/**/*.js", TaskAction::noop());
        watches.add_alt_watch("watchify");

        let described: Vec<String> = watches
            .bindings()
            .iter()
            .map(|b| format!("{} -> {}", b.pattern, b.target.describe()))
            .collect();
        assert_eq!(
            described,
            vec![
                "frontend/styles/**/*.scss -> styles",
                "frontend/scripts/**/*.js -> <inline step>"
            ]
        );
        assert_eq!(watches.alt_watch(), ["watchify"]);
        assert!(!watches.is_empty());
    }
}
