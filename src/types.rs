// src/types.rs

//! Small shared types used across the config, task and assembly layers.

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// A resolved configuration value.
///
/// Config layers are TOML documents, so values keep their TOML shape
/// (strings, numbers, arrays, tables) all the way to the caller.
pub type ConfigValue = toml::Value;

/// Sentinel returned by config lookups that have neither a configured value
/// nor a fallback.
pub const REQUIRED: &str = "REQUIRED";

/// Render a config value as a plain string.
///
/// Strings are returned without TOML quoting; every other value uses its
/// TOML representation.
pub fn value_to_string(value: &ConfigValue) -> String {
    match value {
        ConfigValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Anything that can be turned into one or more task names.
///
/// Lets `depends("a")`, `depends(["a", "b"])` and `depends(vec![..])` share a
/// single method.
pub trait IntoTaskNames {
    fn into_task_names(self) -> Vec<TaskName>;
}

impl IntoTaskNames for &str {
    fn into_task_names(self) -> Vec<TaskName> {
        vec![self.to_string()]
    }
}

impl IntoTaskNames for String {
    fn into_task_names(self) -> Vec<TaskName> {
        vec![self]
    }
}

impl IntoTaskNames for &String {
    fn into_task_names(self) -> Vec<TaskName> {
        vec![self.clone()]
    }
}

impl<T: Into<TaskName>> IntoTaskNames for Vec<T> {
    fn into_task_names(self) -> Vec<TaskName> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<TaskName>, const N: usize> IntoTaskNames for [T; N] {
    fn into_task_names(self) -> Vec<TaskName> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Clone + Into<TaskName>> IntoTaskNames for &[T] {
    fn into_task_names(self) -> Vec<TaskName> {
        self.iter().cloned().map(Into::into).collect()
    }
}
