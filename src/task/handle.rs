// src/task/handle.rs

use crate::task::action::TaskAction;
use crate::types::{IntoTaskNames, TaskName};

/// Mutable descriptor of a single named task.
///
/// Handles are created by [`TaskRegistry::module`](super::TaskRegistry::module)
/// and mutated by modules while they register. The assembler reads them once,
/// after discovery has finished.
#[derive(Debug, Clone)]
pub struct ModuleHandle {
    name: TaskName,
    prerequisites: Vec<TaskName>,
    post_dependencies: Vec<TaskName>,
    action: Option<TaskAction>,
}

impl ModuleHandle {
    pub(crate) fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            prerequisites: Vec::new(),
            post_dependencies: Vec::new(),
            action: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tasks that must finish before this one, in declaration order.
    pub fn prerequisites(&self) -> &[TaskName] {
        &self.prerequisites
    }

    /// Tasks that should end up depending on this one.
    pub fn post_dependencies(&self) -> &[TaskName] {
        &self.post_dependencies
    }

    pub fn action_ref(&self) -> Option<&TaskAction> {
        self.action.as_ref()
    }

    /// Append one or more prerequisites.
    pub fn depends(&mut self, names: impl IntoTaskNames) -> &mut Self {
        self.prerequisites.extend(names.into_task_names());
        self
    }

    /// Declare that `names` should depend on this task.
    ///
    /// Nothing is linked here; the assembler turns these into prerequisites
    /// of the named tasks once every module has registered, and skips names
    /// that never registered.
    pub fn depended_by(&mut self, names: impl IntoTaskNames) -> &mut Self {
        self.post_dependencies.extend(names.into_task_names());
        self
    }

    /// Set the step executed when the task runs, replacing any previous one.
    pub fn action(&mut self, action: TaskAction) -> &mut Self {
        self.action = Some(action);
        self
    }

    pub(crate) fn into_parts(self) -> (TaskName, Vec<TaskName>, Option<TaskAction>) {
        (self.name, self.prerequisites, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depends_accepts_one_or_many() {
        let mut handle = ModuleHandle::new("styles");
        handle.depends("clean").depends(["lint", "fonts"]);
        assert_eq!(handle.prerequisites(), ["clean", "lint", "fonts"]);
    }

    #[test]
    fn post_dependencies_are_only_recorded() {
        let mut handle = ModuleHandle::new("clean");
        handle.depended_by(vec!["styles", "scripts"]);
        assert_eq!(handle.post_dependencies(), ["styles", "scripts"]);
        assert!(handle.prerequisites().is_empty());
        assert!(handle.action_ref().is_none());
    }
}
