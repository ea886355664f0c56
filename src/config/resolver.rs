// src/config/resolver.rs

//! Dotted-key config lookups with fallbacks.
//!
//! Every lookup is answered from the config source under the `opine.` prefix.
//! Keys that are not configured fall back to the caller's default and are
//! recorded in the *missing* tree; keys without a default are additionally
//! recorded in the *required* tree, which the assembler turns into a single
//! fatal error once all modules have registered.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::config::source::ConfigSource;
use crate::config::tree::ConfigTree;
use crate::types::{ConfigValue, REQUIRED, value_to_string};

/// Prefix under which every key is looked up in the config source.
pub const CONFIG_PREFIX: &str = "opine";

/// Default for `base.source`.
pub const DEFAULT_BASE_SOURCE: &str = "frontend";

/// Default for `base.dest`.
pub const DEFAULT_BASE_DEST: &str = "public";

#[derive(Debug)]
pub struct ConfigResolver {
    source: Box<dyn ConfigSource>,
    missing: ConfigTree,
    required: ConfigTree,
    /// First resolution of each identifier; later lookups reuse it.
    resolved: HashMap<String, ConfigValue>,
    base_source: String,
    base_dest: String,
}

impl ConfigResolver {
    /// Wrap a config source and resolve `base.source` / `base.dest`.
    pub fn new(source: Box<dyn ConfigSource>) -> Self {
        let mut resolver = Self {
            source,
            missing: ConfigTree::new(),
            required: ConfigTree::new(),
            resolved: HashMap::new(),
            base_source: String::new(),
            base_dest: String::new(),
        };

        resolver.base_source = value_to_string(
            &resolver.get_config("base.source", Some(DEFAULT_BASE_SOURCE.into())),
        );
        resolver.base_dest = value_to_string(
            &resolver.get_config("base.dest", Some(DEFAULT_BASE_DEST.into())),
        );
        resolver
    }

    /// Resolve `id` (e.g. `"styles.source"`).
    ///
    /// Returns the configured value, else `fallback`, else the string
    /// [`REQUIRED`]. A missing key is never an error at this point.
    pub fn get_config(&mut self, id: &str, fallback: Option<ConfigValue>) -> ConfigValue {
        if let Some(value) = self.resolved.get(id) {
            trace!(key = %id, "config value already resolved this run");
            return value.clone();
        }

        let key = format!("{CONFIG_PREFIX}.{id}");
        let value = match self.source.get(&key) {
            Some(value) => {
                trace!(%key, "config value found");
                value
            }
            None => match fallback {
                Some(fallback) => {
                    debug!(key = %id, value = %fallback, "config value not set; using default");
                    self.missing.set_path(id, ConfigTree::Value(fallback.clone()));
                    fallback
                }
                None => {
                    warn!(key = %id, "required config value is not set");
                    self.missing.set_path(id, ConfigTree::Required);
                    self.required.set_path(id, ConfigTree::Required);
                    ConfigValue::String(REQUIRED.to_string())
                }
            },
        };

        self.resolved.insert(id.to_string(), value.clone());
        value
    }

    /// [`get_config`](Self::get_config) rendered as a plain string.
    pub fn get_string(&mut self, id: &str, fallback: Option<&str>) -> String {
        value_to_string(&self.get_config(id, fallback.map(ConfigValue::from)))
    }

    /// Glob patterns for the sources of `id`.
    ///
    /// The directory comes from `<id>.source` (default `<base.source>/<id>`)
    /// and the extensions from `<id>.extensions` (default `extensions`). A
    /// configured single string counts as a one-element list. Extensions
    /// starting with `!` become exclusion patterns.
    pub fn get_sources<I, S>(&mut self, id: &str, extensions: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default_dir = format!("{}/{}", self.base_source, id);
        let dir = self.get_string(&format!("{id}.source"), Some(&default_dir));

        let default_exts = ConfigValue::Array(
            extensions
                .into_iter()
                .map(|e| ConfigValue::String(e.into()))
                .collect(),
        );
        let exts = self.get_config(&format!("{id}.extensions"), Some(default_exts));

        extension_list(id, &exts)
            .iter()
            .map(|ext| match ext.strip_prefix('!') {
                Some(negated) => format!("!{dir}/**/*{negated}"),
                None => format!("{dir}/**/*{ext}"),
            })
            .collect()
    }

    /// Destination directory for `id`: `<id>.dest`, default `<base.dest>/<id>`.
    pub fn get_dest(&mut self, id: &str) -> String {
        let default_dest = format!("{}/{}", self.base_dest, id);
        self.get_string(&format!("{id}.dest"), Some(&default_dest))
    }

    pub fn base_source(&self) -> &str {
        &self.base_source
    }

    pub fn base_dest(&self) -> &str {
        &self.base_dest
    }

    /// Every key that used a default or is still required.
    pub fn missing(&self) -> &ConfigTree {
        &self.missing
    }

    /// Keys that had neither a configured value nor a fallback.
    pub fn required(&self) -> &ConfigTree {
        &self.required
    }

    pub fn has_required(&self) -> bool {
        !self.required.is_empty()
    }
}

fn extension_list(id: &str, value: &ConfigValue) -> Vec<String> {
    match value {
        ConfigValue::String(s) => vec![s.clone()],
        ConfigValue::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                ConfigValue::String(s) => Some(s.clone()),
                other => {
                    warn!(key = %id, value = %other, "ignoring non-string extension");
                    None
                }
            })
            .collect(),
        other => {
            warn!(key = %id, value = %other, "extensions must be a string or a list of strings");
            Vec::new()
        }
    }
}
