//! Configuration file support
//!
//! Loads settings from ~/.hilite.toml (or %USERPROFILE%\.hilite.toml on Windows)
//!
//! Example:
//! ```toml
//! # hilite configuration
//! syntax-path = "/usr/share/hilite/syntax"
//! themes-file = "/home/me/.hilite-themes.json"
//! active-theme = "COBALT"
//! spell-check = true
//! dictionary = "/usr/share/dict/words"
//! preload = ["cpp", "py", "sh"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SyntaxError};
use crate::syntax::pattern_file;

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Directory holding the `syn_<tag>.json` pattern files
    pub syntax_path: PathBuf,
    /// JSON theme store
    pub themes_file: Option<PathBuf>,
    /// Theme to activate at startup (overrides the store's own choice)
    pub active_theme: Option<String>,
    /// Whether the spell overlay is on
    pub spell_check: bool,
    /// Word list used by the spell overlay
    pub dictionary: Option<PathBuf>,
    /// Syntax tags loaded at startup
    pub preload: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            syntax_path: PathBuf::from("syntax"),
            themes_file: None,
            active_theme: None,
            spell_check: false,
            dictionary: None,
            preload: Vec::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".hilite.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".hilite.toml"))
        }
    }

    /// Load configuration from the default location.
    ///
    /// A missing file gives the defaults; a broken one is logged and
    /// the defaults are used instead.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };
        if !path.exists() {
            return Config::default();
        }

        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "ignoring config file");
                Config::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SyntaxError::MissingFile(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(|e| SyntaxError::io(path, e))?;
        let config = Self::parse(&contents)?;
        debug!(file = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Pattern files for the `preload` tags
    pub fn preload_paths(&self) -> Vec<PathBuf> {
        self.preload
            .iter()
            .map(|tag| pattern_file(&self.syntax_path, tag.trim()))
            .collect()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let body = toml::to_string(self).map_err(|e| SyntaxError::Message(e.to_string()))?;
        let contents = format!("# hilite configuration\n\n{}", body);
        fs::write(path, contents).map_err(|e| SyntaxError::io(path, e))
    }
}
