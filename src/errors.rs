// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::config::ConfigTree;

#[derive(Error, Debug)]
pub enum OpineError {
    /// One or more config keys had neither a configured value nor a fallback.
    ///
    /// Carries the whole required tree so every missing key is reported at once.
    #[error("Required config missing:\n{}\nThe missing configuration values must be defined.", .0.to_pretty_json())]
    MissingRequiredConfig(ConfigTree),

    #[error("Module '{module}' failed to register: {source}")]
    ModuleError {
        module: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Task runner error: {0}")]
    RunnerError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, OpineError>;
