// src/config/loader.rs

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::source::{ENV_OVERRIDE_PREFIX, LayeredConfig};
use crate::errors::Result;

/// Environment variable naming the config directory.
pub const CONFIG_DIR_ENV_VAR: &str = "OPINE_CONFIG_DIR";

/// Environment variable naming the active environment.
pub const ENV_NAME_ENV_VAR: &str = "OPINE_ENV";

/// Environment used when none is given.
pub const DEFAULT_ENV: &str = "development";

/// Directory name searched for when no config directory is given.
pub const CONFIG_DIR_NAME: &str = "config";

/// Where to load config layers from and which environment is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub dir: PathBuf,
    pub env: String,
}

impl ConfigLocation {
    /// Resolve the location from explicit values, then the process
    /// environment, then defaults.
    ///
    /// - dir: `explicit_dir`, `OPINE_CONFIG_DIR`, nearest `config/` above
    ///   `start`, else `./config`.
    /// - env: `explicit_env`, `OPINE_ENV`, else `development`.
    pub fn resolve(start: &Path, explicit_dir: Option<&str>, explicit_env: Option<&str>) -> Self {
        let dir = explicit_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var(CONFIG_DIR_ENV_VAR).ok().map(PathBuf::from))
            .or_else(|| find_config_dir(start))
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR_NAME));

        let env = explicit_env
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_NAME_ENV_VAR).ok())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENV.to_string());

        Self { dir, env }
    }

    /// Candidate files in merge order (later files override earlier ones).
    pub fn layer_files(&self) -> Vec<PathBuf> {
        [
            "default".to_string(),
            self.env.clone(),
            "local".to_string(),
            format!("local-{}", self.env),
        ]
        .iter()
        .map(|stem| self.dir.join(format!("{stem}.toml")))
        .collect()
    }
}

/// Walk up from `start` looking for a directory that contains `config/`.
pub fn find_config_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Load every existing layer file for `location`.
///
/// Missing files are skipped; unreadable or invalid files are errors.
/// Environment overrides are *not* applied here; see [`load_with_env`].
pub fn load_layers(location: &ConfigLocation) -> Result<LayeredConfig> {
    let mut cfg = LayeredConfig::new();

    for path in location.layer_files() {
        if !path.is_file() {
            debug!(path = %path.display(), "config layer not present; skipping");
            continue;
        }
        let contents = fs::read_to_string(&path)?;
        cfg.push_toml_str(&path.display().to_string(), &contents)?;
    }

    info!(
        dir = %location.dir.display(),
        env = %location.env,
        layers = cfg.layers().len(),
        "configuration loaded"
    );
    Ok(cfg)
}

/// Load the file layers and then apply `OPINE__*` variables from the
/// process environment on top.
pub fn load_with_env(location: &ConfigLocation) -> Result<LayeredConfig> {
    let mut cfg = load_layers(location)?;
    cfg.apply_env_overrides(utf8_env_vars(std::env::vars_os()));
    Ok(cfg)
}

/// Keep the variables whose name and value are valid UTF-8.
///
/// Anything else cannot be a usable override; a skipped variable that looks
/// like one is logged.
fn utf8_env_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (name, _) => {
                let name = match name {
                    Ok(name) => name,
                    Err(raw) => raw.to_string_lossy().into_owned(),
                };
                if name.starts_with(ENV_OVERRIDE_PREFIX) {
                    warn!(var = %name, "ignoring config override that is not valid UTF-8");
                }
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_files_follow_merge_order() {
        let location = ConfigLocation {
            dir: PathBuf::from("cfg"),
            env: "production".to_string(),
        };
        let files: Vec<String> = location
            .layer_files()
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            files,
            vec![
                "cfg/default.toml",
                "cfg/production.toml",
                "cfg/local.toml",
                "cfg/local-production.toml"
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_variables_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("BROKEN"), OsString::from_vec(vec![0xff, 0xfe])),
            (
                OsString::from("OPINE__BASE__DEST"),
                OsString::from_vec(vec![b'd', 0xff]),
            ),
            (OsString::from_vec(vec![0xff]), OsString::from("x")),
            (OsString::from("OPINE__BASE__SOURCE"), OsString::from("src")),
        ];

        assert_eq!(
            utf8_env_vars(vars),
            vec![("OPINE__BASE__SOURCE".to_string(), "src".to_string())]
        );
    }

    #[test]
    fn explicit_values_take_priority() {
        let location = ConfigLocation::resolve(Path::new("."), Some("elsewhere"), Some("staging"));
        assert_eq!(location.dir, PathBuf::from("elsewhere"));
        assert_eq!(location.env, "staging");
    }
}
