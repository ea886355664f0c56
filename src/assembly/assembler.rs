// src/assembly/assembler.rs

//! The single assembly pass.
//!
//! Order of operations:
//! 1. refuse to continue if any config key is required but unset,
//! 2. synthesise `build`, `default` and `deploy`,
//! 3. turn post-dependency declarations into prerequisites,
//! 4. install every registered task,
//! 5. install `watch`, 6. `develop` and 7. `config-defaults`.
//!
//! Steps 1–3 happen in [`GraphAssembler::assemble`]; steps 4–7 in
//! [`AssembledGraph::install`]. Only step 1 can fail on its own, and it runs
//! before anything reaches the runner.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::assembly::context::AssemblyContext;
use crate::assembly::runner::{TaskRunner, TaskSpec};
use crate::config::ConfigTree;
use crate::errors::{OpineError, Result};
use crate::task::{ModuleHandle, TaskAction, TaskRegistry};
use crate::types::TaskName;
use crate::watch::WatchBinding;

pub const BUILD_TASK: &str = "build";
pub const DEFAULT_TASK: &str = "default";
pub const DEPLOY_TASK: &str = "deploy";
pub const WATCH_TASK: &str = "watch";
pub const DEVELOP_TASK: &str = "develop";
pub const CONFIG_DEFAULTS_TASK: &str = "config-defaults";

/// Names installed by the assembler itself after all registered tasks.
///
/// A module registering one of these is overridden by the aggregate.
pub const SYNTHESIZED_TASKS: [&str; 3] = [WATCH_TASK, DEVELOP_TASK, CONFIG_DEFAULTS_TASK];

/// Inverse edge `declarer` → `target` collected from post-dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEdge {
    pub declarer: TaskName,
    pub target: TaskName,
}

#[derive(Debug, Default)]
pub struct GraphAssembler;

impl GraphAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Validate the context and resolve it into an [`AssembledGraph`].
    pub fn assemble(&self, ctx: AssemblyContext) -> Result<AssembledGraph> {
        let AssemblyContext {
            config,
            mut tasks,
            watches,
        } = ctx;

        if config.has_required() {
            let required = config.required().clone();
            error!(
                missing = ?required.leaf_paths(),
                "required config missing:\n{}",
                required.to_pretty_json()
            );
            return Err(OpineError::MissingRequiredConfig(required));
        }

        synthesize_aggregates(&mut tasks);

        let edges = collect_post_edges(&tasks);
        resolve_post_edges(&mut tasks, &edges);

        let tasks: Vec<TaskSpec> = tasks
            .into_handles()
            .into_iter()
            .map(into_spec)
            .collect();

        info!(
            tasks = tasks.len(),
            watches = watches.bindings().len(),
            alt_watches = watches.alt_watch().len(),
            "task graph assembled"
        );

        Ok(AssembledGraph {
            tasks,
            bindings: watches.bindings().to_vec(),
            alt_watch: watches.alt_watch().to_vec(),
            missing_config: config.missing().clone(),
        })
    }
}

/// Step 2: `build` gains the build members, `default`/`deploy` depend on it.
fn synthesize_aggregates(tasks: &mut TaskRegistry) {
    let builds = tasks.builds().to_vec();
    tasks.module(BUILD_TASK).depends(builds);
    tasks.module(DEFAULT_TASK).depends(BUILD_TASK);
    tasks.module(DEPLOY_TASK).depends(BUILD_TASK);
}

/// Step 3, phase one: every inverse edge, in registry then declaration order.
pub fn collect_post_edges(tasks: &TaskRegistry) -> Vec<PostEdge> {
    tasks
        .iter()
        .flat_map(|handle| {
            handle.post_dependencies().iter().map(|target| PostEdge {
                declarer: handle.name().to_string(),
                target: target.clone(),
            })
        })
        .collect()
}

/// Step 3, phase two: link edges whose target exists; skip the rest.
pub fn resolve_post_edges(tasks: &mut TaskRegistry, edges: &[PostEdge]) {
    for edge in edges {
        match tasks.get_mut(&edge.target) {
            Some(target) => {
                debug!(
                    task = %edge.target,
                    prerequisite = %edge.declarer,
                    "linking post-dependency"
                );
                target.depends(edge.declarer.as_str());
            }
            None => {
                debug!(
                    declarer = %edge.declarer,
                    target = %edge.target,
                    "post-dependency target never registered; no edge created"
                );
            }
        }
    }
}

fn into_spec(handle: ModuleHandle) -> TaskSpec {
    let (name, prerequisites, action) = handle.into_parts();
    TaskSpec {
        name,
        prerequisites,
        action: action.unwrap_or_else(TaskAction::noop),
    }
}

/// Validated, fully linked task set waiting to be installed.
#[derive(Debug, Clone)]
pub struct AssembledGraph {
    tasks: Vec<TaskSpec>,
    bindings: Vec<WatchBinding>,
    alt_watch: Vec<TaskName>,
    missing_config: ConfigTree,
}

impl AssembledGraph {
    /// Registered tasks (including `build`/`default`/`deploy`) in
    /// registration order.
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    pub fn alt_watch(&self) -> &[TaskName] {
        &self.alt_watch
    }

    /// Every config key that used a default or is required.
    pub fn missing_config(&self) -> &ConfigTree {
        &self.missing_config
    }

    /// Text printed by the `config-defaults` task.
    pub fn config_defaults_report(&self) -> String {
        self.missing_config.to_pretty_json()
    }

    /// Every task `install` would define, in installation order.
    ///
    /// The built-in `watch`, `develop` and `config-defaults` tasks appear
    /// with their prerequisites but a no-op action, since their real actions
    /// need a runner. Registered tasks shadowed by them are left out.
    pub fn planned_tasks(&self) -> Vec<TaskSpec> {
        let mut planned: Vec<TaskSpec> = self
            .tasks
            .iter()
            .filter(|t| !SYNTHESIZED_TASKS.contains(&t.name.as_str()))
            .cloned()
            .collect();
        for name in SYNTHESIZED_TASKS {
            let prerequisites = if name == DEVELOP_TASK {
                vec![BUILD_TASK.to_string()]
            } else {
                Vec::new()
            };
            planned.push(TaskSpec {
                name: name.to_string(),
                prerequisites,
                action: TaskAction::noop(),
            });
        }
        planned
    }

    /// Steps 4–7: install everything into `runner`.
    pub fn install(self, runner: Arc<dyn TaskRunner>) -> Result<()> {
        let report = self.config_defaults_report();
        for task in self.tasks {
            if SYNTHESIZED_TASKS.contains(&task.name.as_str()) {
                warn!(
                    task = %task.name,
                    "module-registered task shadows a built-in aggregate; skipping it"
                );
                continue;
            }
            debug!(task = %task.name, prerequisites = ?task.prerequisites, "installing task");
            runner.install(task)?;
        }

        runner.install(watch_task(Arc::clone(&runner), self.bindings, self.alt_watch))?;
        runner.install(develop_task(Arc::clone(&runner)))?;
        runner.install(config_defaults_task(report))?;

        info!("all tasks installed");
        Ok(())
    }
}

/// Step 5: start alt-watch tasks, install path-triggers, never finish.
fn watch_task(
    runner: Arc<dyn TaskRunner>,
    bindings: Vec<WatchBinding>,
    alt_watch: Vec<TaskName>,
) -> TaskSpec {
    let bindings = Arc::new(bindings);
    let alt_watch = Arc::new(alt_watch);

    let action = TaskAction::new(move || {
        let runner = Arc::clone(&runner);
        let bindings = Arc::clone(&bindings);
        let alt_watch = Arc::clone(&alt_watch);
        async move {
            for task in alt_watch.iter() {
                debug!(task = %task, "starting alt-watch task");
                runner.start(task)?;
            }
            for binding in bindings.iter() {
                info!(
                    pattern = %binding.pattern,
                    target = %binding.target.describe(),
                    "watching"
                );
                runner.watch(&binding.pattern, binding.target.clone())?;
            }
            // A watch is never done; the runner cancels it.
            std::future::pending::<Result<()>>().await
        }
    });

    TaskSpec {
        name: WATCH_TASK.to_string(),
        prerequisites: Vec::new(),
        action,
    }
}

/// Step 6: build everything, then start `watch`.
fn develop_task(runner: Arc<dyn TaskRunner>) -> TaskSpec {
    let action = TaskAction::from_fn(move || runner.start(WATCH_TASK));
    TaskSpec {
        name: DEVELOP_TASK.to_string(),
        prerequisites: vec![BUILD_TASK.to_string()],
        action,
    }
}

/// Step 7: print the defaulted config keys.
fn config_defaults_task(rendered: String) -> TaskSpec {
    let action = TaskAction::from_fn(move || {
        println!("{rendered}");
        Ok(())
    });
    TaskSpec {
        name: CONFIG_DEFAULTS_TASK.to_string(),
        prerequisites: Vec::new(),
        action,
    }
}
