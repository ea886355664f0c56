// src/task/mod.rs

//! Task descriptors and the registry that owns them.
//!
//! - [`handle`] holds the per-task [`ModuleHandle`] modules mutate while they
//!   register (prerequisites, post-dependencies, action).
//! - [`registry`] maps names to handles in registration order and keeps the
//!   `build` membership list.
//! - [`action`] defines the executable step type handed to the task runner.

pub mod action;
pub mod handle;
pub mod registry;

pub use action::{ActionFuture, TaskAction};
pub use handle::ModuleHandle;
pub use registry::TaskRegistry;
