// src/discovery/mod.rs

//! Module discovery.
//!
//! Rust has no equivalent of loading arbitrary packages by name at runtime,
//! so modules are plain values implementing [`OpineModule`] that the host
//! binary collects into a [`ModuleCatalog`]. Discovery then means: keep the
//! modules whose names fit the namespace pattern and let each one register
//! against the [`AssemblyContext`].
//!
//! Catalog order is not part of the contract. Ordering between tasks of
//! different modules goes through prerequisites and post-dependencies.

pub mod filter;

use std::fmt;

use tracing::{debug, info};

use crate::assembly::AssemblyContext;
use crate::errors::{OpineError, Result};

pub use filter::{ModuleFilter, NAMESPACE};

/// A pluggable build module.
pub trait OpineModule {
    /// Package-style name such as `opine-sass`.
    fn name(&self) -> &str;

    /// Register tasks, watches and config lookups.
    fn register(&self, ctx: &mut AssemblyContext) -> anyhow::Result<()>;
}

/// Adapter turning a closure into an [`OpineModule`].
pub struct FnModule<F> {
    name: String,
    register: F,
}

impl<F> FnModule<F>
where
    F: Fn(&mut AssemblyContext) -> anyhow::Result<()>,
{
    pub fn new(name: impl Into<String>, register: F) -> Self {
        Self {
            name: name.into(),
            register,
        }
    }
}

impl<F> OpineModule for FnModule<F>
where
    F: Fn(&mut AssemblyContext) -> anyhow::Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, ctx: &mut AssemblyContext) -> anyhow::Result<()> {
        (self.register)(ctx)
    }
}

impl<F> fmt::Debug for FnModule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The set of modules available to a host binary.
#[derive(Default)]
pub struct ModuleCatalog {
    modules: Vec<Box<dyn OpineModule>>,
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.modules.iter().map(|m| m.name()))
            .finish()
    }
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: impl OpineModule + 'static) -> &mut Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn with(mut self, module: impl OpineModule + 'static) -> Self {
        self.add(module);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules whose names pass `filter`, in catalog order.
    pub fn discover<'a>(
        &'a self,
        filter: &'a ModuleFilter,
    ) -> impl Iterator<Item = &'a dyn OpineModule> + 'a {
        self.modules
            .iter()
            .map(|m| -> &'a dyn OpineModule { m.as_ref() })
            .filter(move |m| {
                let keep = filter.matches(m.name());
                if !keep {
                    debug!(module = %m.name(), "skipping module outside the namespace");
                }
                keep
            })
    }

    /// Let every discovered module register against `ctx`.
    ///
    /// Returns the names of the modules that registered. The first module
    /// that fails aborts the run.
    pub fn register_all(
        &self,
        filter: &ModuleFilter,
        ctx: &mut AssemblyContext,
    ) -> Result<Vec<String>> {
        let mut registered = Vec::new();
        for module in self.discover(filter) {
            debug!(module = %module.name(), "registering module");
            module
                .register(ctx)
                .map_err(|source| OpineError::ModuleError {
                    module: module.name().to_string(),
                    source,
                })?;
            registered.push(module.name().to_string());
        }
        info!(modules = ?registered, "modules registered");
        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayeredConfig;

    #[test]
    fn only_namespaced_modules_register() {
        let catalog = ModuleCatalog::new()
            .with(FnModule::new("opine-styles", |ctx: &mut AssemblyContext| {
                ctx.module("styles");
                Ok(())
            }))
            .with(FnModule::new("gulp-sass", |ctx: &mut AssemblyContext| {
                ctx.module("sass");
                Ok(())
            }));

        let filter = ModuleFilter::for_namespace(NAMESPACE).unwrap();
        let mut ctx = AssemblyContext::new(Box::new(LayeredConfig::new()));
        let registered = catalog.register_all(&filter, &mut ctx).unwrap();

        assert_eq!(registered, ["opine-styles"]);
        assert!(ctx.tasks().contains("styles"));
        assert!(!ctx.tasks().contains("sass"));
    }

    #[test]
    fn failing_module_is_reported_by_name() {
        let catalog = ModuleCatalog::new().with(FnModule::new(
            "opine-broken",
            |_: &mut AssemblyContext| Err(anyhow::anyhow!("no compiler found")),
        ));
        let filter = ModuleFilter::for_namespace(NAMESPACE).unwrap();
        let mut ctx = AssemblyContext::new(Box::new(LayeredConfig::new()));

        match catalog.register_all(&filter, &mut ctx) {
            Err(OpineError::ModuleError { module, source }) => {
                assert_eq!(module, "opine-broken");
                assert!(source.to_string().contains("no compiler"));
            }
            other => panic!("expected ModuleError, got {other:?}"),
        }
    }
}
