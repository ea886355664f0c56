// src/assembly/mod.rs

//! Task-graph assembly.
//!
//! - [`context`] holds the per-run [`AssemblyContext`] modules register
//!   against, plus the module-scoped [`ModuleScope`] view.
//! - [`assembler`] runs the single assembly pass (required-config gate,
//!   aggregates, post-dependency linking) and installs the result.
//! - [`runner`] defines the interface of the external [`TaskRunner`].
//! - [`graph`] gives a `petgraph` view of the assembled tasks for plan
//!   output and diagnostics.

pub mod assembler;
pub mod context;
pub mod graph;
pub mod runner;

pub use assembler::{
    AssembledGraph, GraphAssembler, PostEdge, BUILD_TASK, CONFIG_DEFAULTS_TASK, DEFAULT_TASK,
    DEPLOY_TASK, DEVELOP_TASK, WATCH_TASK,
};
pub use context::{AssemblyContext, ModuleScope};
pub use graph::{TaskGraph, UnknownPrerequisite};
pub use runner::{TaskRunner, TaskSpec};
