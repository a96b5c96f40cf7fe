//! Settings for locating configuration files, with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/castor/castor.toml`
//! 3. Environment variables: `CASTOR_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Default file extension of configuration files.
pub const DEFAULT_EXTENSION: &str = "conf";

/// Where configuration files live and how they are named.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Installation root; relative paths are completed against it
    pub root_dir: PathBuf,
    /// Directory holding `<name>.conf` files (default: `<root_dir>/etc`)
    pub config_dir: Option<PathBuf>,
    /// Host name used for host-specific overrides (`<config_dir>/<hostname>/`)
    pub hostname: String,
    /// File extension without the dot
    pub extension: String,
}

/// Raw settings for intermediate parsing (every field optional).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_dir: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub hostname: Option<String>,
    pub extension: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            config_dir: None,
            hostname: default_hostname(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

fn default_root_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"))
}

fn default_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "localhost".into())
}

/// Get the XDG config directory for castor.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "castor").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global settings file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("castor.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw)
        .map(|expanded| PathBuf::from(expanded.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Effective configuration directory.
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir
            .clone()
            .unwrap_or_else(|| self.root_dir.join("etc"))
    }

    /// Joins relative paths onto `root_dir`; absolute paths pass through.
    pub fn complete_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path fields.
    fn expand_paths(&mut self) {
        self.root_dir = expand(&self.root_dir);
        self.config_dir = self.config_dir.as_deref().map(expand);
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_dir: overlay
                .root_dir
                .clone()
                .unwrap_or_else(|| self.root_dir.clone()),
            config_dir: overlay.config_dir.clone().or_else(|| self.config_dir.clone()),
            hostname: overlay
                .hostname
                .clone()
                .unwrap_or_else(|| self.hostname.clone()),
            extension: overlay
                .extension
                .clone()
                .unwrap_or_else(|| self.extension.clone()),
        }
    }

    /// Load settings with layered precedence.
    pub fn load() -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref())
    }

    /// Like [`load`](Self::load) with an explicit settings file instead of the XDG one.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply CASTOR_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CASTOR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_dir") {
            settings.root_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("config_dir") {
            settings.config_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("hostname") {
            settings.hostname = val;
        }
        if let Ok(val) = config.get_string("extension") {
            settings.extension = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template settings file.
    pub fn template() -> String {
        r#"# castor settings
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/castor/castor.toml
#   Env:    CASTOR_* environment variables (CASTOR_ROOT_DIR, CASTOR_CONFIG_DIR, ...)

# Installation root, relative paths are resolved against it
# root_dir = "~"

# Directory with <name>.conf files (default: <root_dir>/etc)
# config_dir = "~/etc"

# Host name for host-specific files in <config_dir>/<hostname>/
# hostname = "myhost"

# Configuration file extension
# extension = "conf"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
