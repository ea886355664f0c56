// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `opine`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "opine",
    version,
    about = "Assemble discovered build modules into a task graph and inspect it.",
    long_about = None
)]
pub struct CliArgs {
    /// Only print the prerequisite closure of this task.
    #[arg(value_name = "TASK")]
    pub task: Option<String>,

    /// Directory holding `default.toml`, `<env>.toml`, `local.toml`, ...
    ///
    /// If omitted, `OPINE_CONFIG_DIR` is used, then the nearest `config/`
    /// directory above the working directory.
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<String>,

    /// Environment name selecting `<env>.toml` (default: `OPINE_ENV` or
    /// `development`).
    #[arg(long, value_name = "NAME")]
    pub env: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `OPINE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print every config key that used a default (or is still required)
    /// instead of the task plan.
    #[arg(long)]
    pub print_defaults: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_task_and_flags() {
        let args = CliArgs::try_parse_from([
            "opine",
            "develop",
            "--env",
            "production",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.task.as_deref(), Some("develop"));
        assert_eq!(args.env.as_deref(), Some("production"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(!args.print_defaults);
    }
}
