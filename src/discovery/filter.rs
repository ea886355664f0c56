// src/discovery/filter.rs

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Namespace used for module names.
pub const NAMESPACE: &str = "opine";

/// Decides which module names belong to a namespace.
///
/// For namespace `opine` this accepts `opine-*` and `*-opine-*` and rejects
/// the core name `opine` itself.
#[derive(Debug, Clone)]
pub struct ModuleFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl ModuleFilter {
    pub fn for_namespace(namespace: &str) -> Result<Self> {
        Self::new(
            &[format!("{namespace}-*"), format!("*-{namespace}-*")],
            &[namespace.to_string()],
        )
    }

    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: build_globset(include).context("building module include patterns")?,
            exclude: build_globset(exclude).context("building module exclude patterns")?,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.include.is_match(name) && !self.exclude.is_match(name)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
