//! Lookup of configuration files by logical name.
//!
//! `get("net")` searches, in order:
//! 1. `<config_dir>/<hostname>/net.conf`
//! 2. `<config_dir>/net.conf`
//! 3. `./net.conf`
//!
//! The first existing file is parsed once and cached.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, Configuration};
use crate::config::Settings;

pub struct ConfigRegistry {
    settings: Settings,
    configs: HashMap<String, Configuration>,
}

impl ConfigRegistry {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            configs: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Candidate files for `name`, most specific first.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        if name.is_empty() {
            return Vec::new();
        }
        let file_name = format!("{}.{}", name, self.settings.extension);
        let config_dir = self.settings.config_dir();
        vec![
            config_dir.join(&self.settings.hostname).join(&file_name),
            config_dir.join(&file_name),
            PathBuf::from(file_name),
        ]
    }

    /// First candidate that exists on disk.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.candidates(name).into_iter().find(|p| p.is_file())
    }

    /// Loads (or returns the cached) configuration for `name`.
    ///
    /// `Ok(None)` when no candidate file exists.
    #[instrument(level = "debug", skip(self))]
    pub fn get(&mut self, name: &str) -> ApplicationResult<Option<&mut Configuration>> {
        if !self.configs.contains_key(name) {
            let Some(path) = self.resolve(name) else {
                debug!("no configuration file for '{}'", name);
                return Ok(None);
            };
            debug!("loading '{}' from {}", name, path.display());
            let config = Configuration::open(&path)?;
            self.configs.insert(name.to_string(), config);
        }
        Ok(self.configs.get_mut(name))
    }

    /// Joins relative paths onto the installation root.
    pub fn complete_path(&self, path: &Path) -> PathBuf {
        self.settings.complete_path(path)
    }
}
