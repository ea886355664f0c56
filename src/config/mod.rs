// src/config/mod.rs

//! Configuration loading and resolution for opine.
//!
//! Responsibilities:
//! - Merge layered TOML files and environment overrides (`loader.rs`,
//!   `source.rs`).
//! - Resolve dotted keys with fallbacks and record defaulted/required keys
//!   (`resolver.rs`).
//! - Represent those records as a nested tree (`tree.rs`).

pub mod loader;
pub mod resolver;
pub mod source;
pub mod tree;

pub use loader::{ConfigLocation, find_config_dir, load_layers, load_with_env};
pub use resolver::ConfigResolver;
pub use source::{ConfigSource, LayeredConfig};
pub use tree::ConfigTree;
