// src/config/tree.rs

//! Nested tree keyed by dotted config identifiers.
//!
//! Used to record which config keys fell back to a default (or had no value
//! at all) so they can be dumped for the operator.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::{ConfigValue, REQUIRED};

/// A node in a dotted-path tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigTree {
    /// A value that was actually used.
    Value(ConfigValue),
    /// No configured value and no fallback.
    Required,
    /// Intermediate node; keys are kept sorted so dumps are deterministic.
    Table(BTreeMap<String, ConfigTree>),
}

impl Default for ConfigTree {
    fn default() -> Self {
        ConfigTree::Table(BTreeMap::new())
    }
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// True for a table with no entries.
    pub fn is_empty(&self) -> bool {
        matches!(self, ConfigTree::Table(map) if map.is_empty())
    }

    /// Store `leaf` at the dotted `path`, creating tables along the way.
    ///
    /// A non-table node sitting on the way to `path` is replaced by a table,
    /// and an existing node at `path` itself is replaced by `leaf`. The empty
    /// path is the single key `""`.
    pub fn set_path(&mut self, path: &str, leaf: ConfigTree) {
        let segments: Vec<&str> = path.split('.').collect();

        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut node = self;
        for segment in parents {
            node = node.child_table(segment);
        }
        node.ensure_table().insert((*last).to_string(), leaf);
    }

    /// Look up the node at the dotted `path`.
    pub fn get_path(&self, path: &str) -> Option<&ConfigTree> {
        let mut node = self;
        for segment in path.split('.') {
            match node {
                ConfigTree::Table(map) => node = map.get(segment)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Dotted paths of every leaf, in tree order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_leaf_paths(self, String::new(), &mut out);
        out
    }

    /// Pretty JSON rendering used for diagnostics.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("<unprintable config tree: {e}>"))
    }

    fn ensure_table(&mut self) -> &mut BTreeMap<String, ConfigTree> {
        if !matches!(self, ConfigTree::Table(_)) {
            *self = ConfigTree::Table(BTreeMap::new());
        }
        match self {
            ConfigTree::Table(map) => map,
            _ => unreachable!("node was just turned into a table"),
        }
    }

    fn child_table(&mut self, key: &str) -> &mut ConfigTree {
        let child = self
            .ensure_table()
            .entry(key.to_string())
            .or_insert_with(ConfigTree::new);
        child.ensure_table();
        child
    }
}

fn collect_leaf_paths(node: &ConfigTree, prefix: String, out: &mut Vec<String>) {
    match node {
        ConfigTree::Table(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_leaf_paths(child, path, out);
            }
        }
        _ => out.push(prefix),
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigTree::Value(value) => value.serialize(serializer),
            ConfigTree::Required => serializer.serialize_str(REQUIRED),
            ConfigTree::Table(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, child) in map {
                    out.serialize_entry(key, child)?;
                }
                out.end()
            }
        }
    }
}
