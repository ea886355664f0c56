// src/task/registry.rs

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::task::handle::ModuleHandle;
use crate::types::TaskName;

/// Insertion-ordered map from task name to [`ModuleHandle`].
///
/// Also records which tasks belong to the `build` aggregate.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    handles: Vec<ModuleHandle>,
    index: HashMap<TaskName, usize>,
    builds: Vec<TaskName>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle for `name`, creating it on first use.
    ///
    /// Asking twice for the same name yields the same handle; two modules
    /// that pick the same name therefore share one task.
    pub fn module(&mut self, name: &str) -> &mut ModuleHandle {
        let idx = match self.index.get(name) {
            Some(&idx) => {
                trace!(task = %name, "reusing existing task handle");
                idx
            }
            None => {
                debug!(task = %name, "registering task");
                self.handles.push(ModuleHandle::new(name));
                let idx = self.handles.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.handles[idx]
    }

    pub fn get(&self, name: &str) -> Option<&ModuleHandle> {
        self.index.get(name).map(|&idx| &self.handles[idx])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ModuleHandle> {
        match self.index.get(name) {
            Some(&idx) => Some(&mut self.handles[idx]),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Handles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleHandle> {
        self.handles.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handles.iter().map(|h| h.name())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Make `task` a prerequisite of the `build` aggregate.
    pub fn add_build(&mut self, task: impl Into<TaskName>) {
        let task = task.into();
        debug!(task = %task, "adding task to build");
        self.builds.push(task);
    }

    /// Build members in the order they were added.
    pub fn builds(&self) -> &[TaskName] {
        &self.builds
    }

    pub(crate) fn into_handles(self) -> Vec<ModuleHandle> {
        self.handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_is_get_or_create() {
        let mut registry = TaskRegistry::new();
        let first: *const ModuleHandle = registry.module("styles");
        registry.module("styles").depends("clean");
        let second: *const ModuleHandle = registry.module("styles");

        assert!(std::ptr::eq(first, second));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("styles").unwrap().prerequisites(), ["clean"]);
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut registry = TaskRegistry::new();
        for name in ["zeta", "alpha", "mid", "alpha"] {
            registry.module(name);
        }
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn builds_keep_order_and_duplicates() {
        let mut registry = TaskRegistry::new();
        registry.add_build("styles");
        registry.add_build("scripts".to_string());
        registry.add_build("styles");
        assert_eq!(registry.builds(), ["styles", "scripts", "styles"]);
        assert!(registry.is_empty());
    }
}
