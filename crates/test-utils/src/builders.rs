use opine::assembly::AssemblyContext;
use opine::config::{ConfigSource, LayeredConfig};
use opine::discovery::FnModule;
use toml::{Table, Value};

/// Builder for a [`LayeredConfig`] to simplify test setup.
///
/// Keys are given without the `opine.` prefix, the way modules ask for them.
#[derive(Default)]
pub struct ConfigBuilder {
    root: Table,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `opine.<key>` to `value`.
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        let mut segments = vec!["opine"];
        segments.extend(key.split('.'));
        insert(&mut self.root, &segments, value.into());
        self
    }

    pub fn build(self) -> LayeredConfig {
        let mut cfg = LayeredConfig::new();
        cfg.push_layer("test", self.root);
        cfg
    }

    pub fn boxed(self) -> Box<dyn ConfigSource> {
        Box::new(self.build())
    }
}

fn insert(table: &mut Table, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            table.insert(last.to_string(), value);
        }
        [first, rest @ ..] => {
            let entry = table
                .entry(first.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            match entry {
                Value::Table(inner) => insert(inner, rest, value),
                other => panic!("'{first}' is already set to {other}"),
            }
        }
    }
}

/// Context over an empty config.
pub fn empty_context() -> AssemblyContext {
    AssemblyContext::new(Box::new(LayeredConfig::new()))
}

/// Shorthand for a closure-backed module.
pub fn module<F>(name: &str, register: F) -> FnModule<F>
where
    F: Fn(&mut AssemblyContext) -> anyhow::Result<()>,
{
    FnModule::new(name, register)
}
