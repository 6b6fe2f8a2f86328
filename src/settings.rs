//! Library settings.
//!
//! The only setting is the location of the git executable. It is resolved once
//! by [`Settings::load`] and handed to each [`Repository`](crate::Repository),
//! so tests (and embedders) can point a repository at a different binary.
//!
//! Priority:
//! 1. `GITREFS_GIT` environment variable
//! 2. `git = "..."` in the settings file (`GITREFS_CONFIG_PATH`, or
//!    `gitrefs/config.toml` under the platform config directory)
//! 3. `git` found on `PATH`, or the bare name `git`

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
use serde::Deserialize;

/// Environment variable naming an explicit settings file.
pub const CONFIG_PATH_ENV_VAR: &str = "GITREFS_CONFIG_PATH";

/// Prefix of environment variables that override settings (`GITREFS_GIT`).
const ENV_PREFIX: &str = "GITREFS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Path to the git executable.
    #[serde(default = "default_git")]
    pub git: PathBuf,
}

fn default_git() -> PathBuf {
    which::which("git").unwrap_or_else(|_| PathBuf::from("git"))
}

impl Default for Settings {
    fn default() -> Self {
        Self { git: default_git() }
    }
}

impl Settings {
    /// Settings that run the given git executable.
    pub fn with_git(git: impl Into<PathBuf>) -> Self {
        Self { git: git.into() }
    }

    /// Load settings from the settings file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(settings_path().as_deref())
    }

    /// Load settings from a specific file (missing files are skipped) and the environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::build(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn build(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            log::debug!("Loading settings from {}", path.display());
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        builder.add_source(env).build()?.try_deserialize()
    }
}

/// Get the settings file path.
fn settings_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("gitrefs").join("config.toml"))
}
