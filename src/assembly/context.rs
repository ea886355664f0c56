// src/assembly/context.rs

use crate::config::{ConfigResolver, ConfigSource};
use crate::task::{ModuleHandle, TaskRegistry};
use crate::types::{ConfigValue, TaskName};
use crate::watch::{WatchRegistry, WatchTarget};

/// Everything modules register against during one run.
///
/// Built once per run and handed by `&mut` to each discovered module, then
/// consumed by [`GraphAssembler::assemble`](super::GraphAssembler::assemble).
#[derive(Debug)]
pub struct AssemblyContext {
    pub(crate) config: ConfigResolver,
    pub(crate) tasks: TaskRegistry,
    pub(crate) watches: WatchRegistry,
}

impl AssemblyContext {
    pub fn new(source: Box<dyn ConfigSource>) -> Self {
        Self {
            config: ConfigResolver::new(source),
            tasks: TaskRegistry::new(),
            watches: WatchRegistry::new(),
        }
    }

    /// See [`ConfigResolver::get_config`].
    pub fn get_config(&mut self, id: &str, fallback: Option<ConfigValue>) -> ConfigValue {
        self.config.get_config(id, fallback)
    }

    /// See [`ConfigResolver::get_string`].
    pub fn get_string(&mut self, id: &str, fallback: Option<&str>) -> String {
        self.config.get_string(id, fallback)
    }

    /// See [`ConfigResolver::get_sources`].
    pub fn get_sources<I, S>(&mut self, id: &str, extensions: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.get_sources(id, extensions)
    }

    /// See [`ConfigResolver::get_dest`].
    pub fn get_dest(&mut self, id: &str) -> String {
        self.config.get_dest(id)
    }

    /// Get or create the handle for task `name`.
    pub fn module(&mut self, name: &str) -> &mut ModuleHandle {
        self.tasks.module(name)
    }

    pub fn add_build(&mut self, task: impl Into<TaskName>) {
        self.tasks.add_build(task);
    }

    pub fn add_alt_watch(&mut self, task: impl Into<TaskName>) {
        self.watches.add_alt_watch(task);
    }

    pub fn add_watch(&mut self, pattern: impl Into<String>, target: impl Into<WatchTarget>) {
        self.watches.add_watch(pattern, target);
    }

    /// The same operations pre-bound to the module called `name`.
    pub fn scope(&mut self, name: &str) -> ModuleScope<'_> {
        ModuleScope {
            ctx: self,
            name: name.to_string(),
        }
    }

    pub fn config(&self) -> &ConfigResolver {
        &self.config
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn watches(&self) -> &WatchRegistry {
        &self.watches
    }
}

/// Module-scoped view of an [`AssemblyContext`].
///
/// Config keys are prefixed with the module name and the build/watch helpers
/// refer to the module's own task:
///
/// ```
/// # use opine::assembly::AssemblyContext;
/// # use opine::config::LayeredConfig;
/// let mut ctx = AssemblyContext::new(Box::new(LayeredConfig::new()));
/// let mut styles = ctx.scope("styles");
/// let sources = styles.get_sources(["scss"]);
/// styles.add_build();
/// styles.add_watch(sources[0].clone());
/// assert_eq!(sources, ["frontend/styles/**/*scss"]);
/// ```
#[derive(Debug)]
pub struct ModuleScope<'a> {
    ctx: &'a mut AssemblyContext,
    name: String,
}

impl ModuleScope<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve `<module>.<key>`.
    pub fn get_config(&mut self, key: &str, fallback: Option<ConfigValue>) -> ConfigValue {
        let id = format!("{}.{key}", self.name);
        self.ctx.get_config(&id, fallback)
    }

    pub fn get_string(&mut self, key: &str, fallback: Option<&str>) -> String {
        let id = format!("{}.{key}", self.name);
        self.ctx.get_string(&id, fallback)
    }

    pub fn get_sources<I, S>(&mut self, extensions: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ctx.get_sources(&self.name, extensions)
    }

    pub fn get_dest(&mut self) -> String {
        self.ctx.get_dest(&self.name)
    }

    /// This module's own task handle.
    pub fn handle(&mut self) -> &mut ModuleHandle {
        self.ctx.module(&self.name)
    }

    pub fn add_build(&mut self) {
        self.ctx.add_build(self.name.clone());
    }

    pub fn add_alt_watch(&mut self) {
        self.ctx.add_alt_watch(self.name.clone());
    }

    /// Re-run this module's task when `pattern` changes.
    pub fn add_watch(&mut self, pattern: impl Into<String>) {
        self.ctx
            .add_watch(pattern, WatchTarget::Task(self.name.clone()));
    }
}
