// src/watch/mod.rs

//! Watch bindings collected during registration.
//!
//! opine does not watch files itself. The `watch` task hands each binding to
//! the task runner and starts the alt-watch tasks, which manage their own
//! watching.

pub mod registry;

pub use registry::{WatchBinding, WatchRegistry, WatchTarget};
