// src/lib.rs

pub mod assembly;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod logging;
pub mod task;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::assembly::{AssembledGraph, AssemblyContext, GraphAssembler, TaskGraph, TaskRunner};
use crate::cli::CliArgs;
use crate::config::{ConfigLocation, ConfigSource, load_with_env};
use crate::discovery::{ModuleCatalog, ModuleFilter, NAMESPACE};

/// Let every namespaced module in `catalog` register against a fresh
/// context backed by `source`.
///
/// Nothing is validated yet; see [`assemble`].
pub fn register(
    source: Box<dyn ConfigSource>,
    catalog: &ModuleCatalog,
) -> errors::Result<AssemblyContext> {
    let filter = ModuleFilter::for_namespace(NAMESPACE)?;
    let mut ctx = AssemblyContext::new(source);
    catalog.register_all(&filter, &mut ctx)?;
    Ok(ctx)
}

/// Register all modules and run the assembly pass.
///
/// Fails with [`errors::OpineError::MissingRequiredConfig`] before anything
/// could be installed if a required key is unset.
pub fn assemble(
    source: Box<dyn ConfigSource>,
    catalog: &ModuleCatalog,
) -> errors::Result<AssembledGraph> {
    let ctx = register(source, catalog)?;
    GraphAssembler::new().assemble(ctx)
}

/// Full pipeline for a host binary: register, assemble, install into
/// `runner`.
pub fn execute(
    source: Box<dyn ConfigSource>,
    catalog: &ModuleCatalog,
    runner: Arc<dyn TaskRunner>,
) -> errors::Result<()> {
    assemble(source, catalog)?.install(runner)
}

/// Register all modules and render every defaulted or required config key
/// as sorted JSON.
///
/// Unlike [`assemble`] this does not stop at required keys; they show up as
/// `"REQUIRED"`.
pub fn defaults_report(
    source: Box<dyn ConfigSource>,
    catalog: &ModuleCatalog,
) -> errors::Result<String> {
    let ctx = register(source, catalog)?;
    Ok(ctx.config().missing().to_pretty_json())
}

/// High-level entry point used by `main.rs`.
///
/// Loads the layered config, lets `catalog` register and prints either the
/// resulting task plan or (with `--print-defaults`) the defaulted config
/// keys. Nothing is executed.
pub fn run(args: CliArgs, catalog: &ModuleCatalog) -> Result<()> {
    let cwd = std::env::current_dir().context("determining working directory")?;
    let location = ConfigLocation::resolve(&cwd, args.config_dir.as_deref(), args.env.as_deref());
    let source = load_with_env(&location)
        .with_context(|| format!("loading config from {}", location.dir.display()))?;

    if args.print_defaults {
        println!("{}", defaults_report(Box::new(source), catalog)?);
        return Ok(());
    }

    let graph = assemble(Box::new(source), catalog)?;
    print_plan(&location, &graph, args.task.as_deref())
}

/// Print tasks, prerequisites and watch bindings.
fn print_plan(location: &ConfigLocation, graph: &AssembledGraph, task: Option<&str>) -> Result<()> {
    let specs = graph.planned_tasks();
    let dag = TaskGraph::from_specs(&specs);

    let order = match task {
        Some(name) => {
            let closure = dag.prerequisite_closure(name);
            if closure.is_empty() {
                bail!("unknown task '{name}'");
            }
            closure
        }
        None => dag.dependency_order(),
    };

    println!("opine plan");
    println!("  config dir = {}", location.dir.display());
    println!("  env = {}", location.env);
    println!();

    println!("tasks ({}):", order.len());
    for name in &order {
        println!("  - {name}");
        if let Some(spec) = specs.iter().find(|s| s.name == *name) {
            if !spec.prerequisites.is_empty() {
                println!("      depends: {:?}", spec.prerequisites);
            }
        }
    }

    if task.is_none() {
        if !graph.bindings().is_empty() {
            println!();
            println!("watches ({}):", graph.bindings().len());
            for binding in graph.bindings() {
                println!("  - {} -> {}", binding.pattern, binding.target.describe());
            }
        }
        if !graph.alt_watch().is_empty() {
            println!();
            println!("alt-watch: {:?}", graph.alt_watch());
        }
    }

    let unknown = dag.unknown_prerequisites(&specs);
    if !unknown.is_empty() {
        println!();
        println!("warnings:");
        for u in &unknown {
            println!(
                "  - '{}' depends on '{}', which no module registered",
                u.task, u.prerequisite
            );
        }
    }

    info!(tasks = order.len(), "plan printed");
    debug!("plan complete (no execution)");
    Ok(())
}
