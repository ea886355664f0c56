// src/config/source.rs

//! Config source abstraction and the layered TOML implementation.

use std::fmt::Debug;

use toml::Table;
use tracing::{debug, warn};

use crate::types::ConfigValue;

/// Prefix of environment variables that override config keys.
///
/// `OPINE__BASE__SOURCE=src` overrides `opine.base.source`. Segments are
/// lowercased, so keys containing uppercase letters cannot be overridden this
/// way.
pub const ENV_OVERRIDE_PREFIX: &str = "OPINE__";

/// Read-only lookup of dotted keys such as `opine.base.source`.
pub trait ConfigSource: Debug {
    fn get(&self, key: &str) -> Option<ConfigValue>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Config assembled from several TOML layers.
///
/// Later layers win; tables are merged key by key rather than replaced.
#[derive(Debug, Clone, Default)]
pub struct LayeredConfig {
    merged: Table,
    layers: Vec<String>,
}

impl LayeredConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document and merge it as a new top layer.
    pub fn from_toml_str(contents: &str) -> crate::errors::Result<Self> {
        let mut cfg = Self::new();
        cfg.push_toml_str("inline", contents)?;
        Ok(cfg)
    }

    /// Parse `contents` and merge it on top of the existing layers.
    pub fn push_toml_str(&mut self, label: &str, contents: &str) -> crate::errors::Result<()> {
        let table: Table = toml::from_str(contents)?;
        self.push_layer(label, table);
        Ok(())
    }

    /// Merge an already-parsed table on top of the existing layers.
    pub fn push_layer(&mut self, label: &str, table: Table) {
        debug!(layer = %label, keys = table.len(), "merging config layer");
        deep_merge(&mut self.merged, table);
        self.layers.push(label.to_string());
    }

    /// Apply `OPINE__A__B=value` style overrides as the top layer.
    ///
    /// Values that parse as TOML (numbers, booleans, arrays, quoted strings)
    /// keep that type; anything else is taken as a bare string.
    pub fn apply_env_overrides<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = Table::new();
        for (name, raw) in vars {
            let Some(rest) = name.as_ref().strip_prefix(ENV_OVERRIDE_PREFIX) else {
                continue;
            };
            let segments: Vec<String> = rest
                .split("__")
                .map(|s| s.to_lowercase())
                .collect();
            if segments.iter().any(|s| s.is_empty()) {
                warn!(var = %name.as_ref(), "ignoring malformed config override variable");
                continue;
            }

            let key = format!("opine.{}", segments.join("."));
            debug!(%key, "config override from environment");
            insert_dotted(&mut overrides, &key, parse_env_value(raw.as_ref()));
        }

        if !overrides.is_empty() {
            self.push_layer("environment", overrides);
        }
    }

    /// Labels of the merged layers, bottom first.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }
}

impl ConfigSource for LayeredConfig {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut value = self.merged.get(first)?;
        for segment in segments {
            value = value.as_table()?.get(segment)?;
        }
        Some(value.clone())
    }
}

fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        if let ConfigValue::Table(incoming) = value {
            if let Some(ConfigValue::Table(existing)) = base.get_mut(&key) {
                deep_merge(existing, incoming);
                continue;
            }
            base.insert(key, ConfigValue::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

fn insert_dotted(table: &mut Table, key: &str, value: ConfigValue) {
    let mut segments: Vec<&str> = key.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut node = table;
    for segment in segments {
        let entry = node
            .entry(segment.to_string())
            .or_insert_with(|| ConfigValue::Table(Table::new()));
        if !entry.is_table() {
            *entry = ConfigValue::Table(Table::new());
        }
        node = match entry {
            ConfigValue::Table(t) => t,
            _ => return,
        };
    }
    node.insert(last.to_string(), value);
}

fn parse_env_value(raw: &str) -> ConfigValue {
    toml::from_str::<Table>(&format!("v = {raw}"))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| ConfigValue::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_win_and_tables_merge() {
        let mut cfg = LayeredConfig::from_toml_str(
            r#"
[opine.base]
source = "frontend"
dest = "public"
"#,
        )
        .unwrap();
        cfg.push_toml_str("production", "[opine.base]\ndest = \"dist\"\n")
            .unwrap();

        assert_eq!(cfg.get("opine.base.source").unwrap().as_str(), Some("frontend"));
        assert_eq!(cfg.get("opine.base.dest").unwrap().as_str(), Some("dist"));
        assert!(cfg.has("opine.base"));
        assert!(!cfg.has("opine.base.missing"));
        assert!(!cfg.has("opine.base.source.deeper"));
    }

    #[test]
    fn env_overrides_use_double_underscore_paths() {
        let mut cfg = LayeredConfig::new();
        cfg.apply_env_overrides([
            ("OPINE__BASE__SOURCE", "src"),
            ("OPINE__SCRIPTS__EXTENSIONS", r#"["ts", "!d.ts"]"#),
            ("OPINE__PORT", "8080"),
            ("OPINE____BROKEN", "x"),
            ("HOME", "/root"),
        ]);

        assert_eq!(cfg.get("opine.base.source").unwrap().as_str(), Some("src"));
        assert_eq!(cfg.get("opine.port").unwrap().as_integer(), Some(8080));
        let exts = cfg.get("opine.scripts.extensions").unwrap();
        assert_eq!(exts.as_array().map(|a| a.len()), Some(2));
        assert_eq!(cfg.layers(), ["environment"]);
    }

    #[test]
    fn override_keys_are_lowercased() {
        let mut cfg = LayeredConfig::from_toml_str("[opine.styles]\nautoPrefix = true\n").unwrap();
        cfg.apply_env_overrides([("OPINE__STYLES__AUTOPREFIX", "false")]);

        assert_eq!(cfg.get("opine.styles.autoPrefix").unwrap().as_bool(), Some(true));
        assert_eq!(cfg.get("opine.styles.autoprefix").unwrap().as_bool(), Some(false));
    }

    #[test]
    fn no_matching_vars_adds_no_layer() {
        let mut cfg = LayeredConfig::new();
        cfg.apply_env_overrides([("PATH", "/usr/bin")]);
        assert!(cfg.layers().is_empty());
    }
}
