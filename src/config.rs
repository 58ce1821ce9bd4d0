//! Configuration file schema for ifacegen.
//!
//! A config file holds defaults for generation options. Command-line
//! flags override it.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dedup::DedupMode;
use crate::error::{IfaceError, Result};
use crate::generate::GenerateOptions;

/// Config file names searched for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["ifacegen.yaml", ".ifacegen.yaml"];

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Top-level config definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    /// Copy method doc comments (default: true)
    #[serde(default)]
    pub copy_docs: Option<bool>,
    /// Method names to leave out of every generated interface
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Only include exported methods (default: false)
    #[serde(default)]
    pub exported_only: Option<bool>,
    /// "textual" (default) or "structural"
    #[serde(default)]
    pub dedup: Option<DedupMode>,
    /// Drop imports not referenced by any signature (default: false)
    #[serde(default)]
    pub prune_imports: Option<bool>,
    /// Comment placed above the package clause
    #[serde(default)]
    pub header: Option<String>,
    /// Doc comment placed above the interface
    #[serde(default)]
    pub iface_comment: Option<String>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| IfaceError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse_str(&content).map_err(|message| IfaceError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse and validate a config from YAML text.
    pub fn parse_str(content: &str) -> std::result::Result<Self, String> {
        // An empty file is a valid, empty config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        validate(&config)?;
        Ok(config)
    }

    /// Locate and load the config for a run started in `dir`.
    ///
    /// An explicit path must exist. Otherwise the working directory is
    /// searched, then the user config directory; finding nothing yields
    /// the default config.
    pub fn discover(dir: &Path, explicit: Option<&Path>) -> Result<(Option<PathBuf>, Self)> {
        if let Some(path) = explicit {
            return Ok((Some(path.to_path_buf()), Self::parse_file(path)?));
        }

        let candidates = DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .chain(user_config_path());

        for path in candidates {
            if path.is_file() {
                let config = Self::parse_file(&path)?;
                return Ok((Some(path), config));
            }
        }
        Ok((None, Self::default()))
    }

    /// Generation options with this config applied over the defaults.
    pub fn to_options(&self) -> GenerateOptions {
        let defaults = GenerateOptions::default();
        GenerateOptions {
            copy_docs: self.copy_docs.unwrap_or(defaults.copy_docs),
            exclude: self.exclude.clone(),
            exported_only: self.exported_only.unwrap_or(defaults.exported_only),
            dedup: self.dedup.unwrap_or(defaults.dedup),
            prune_imports: self.prune_imports.unwrap_or(defaults.prune_imports),
            header: self.header.clone(),
            iface_comment: self.iface_comment.clone(),
        }
    }
}

/// Per-user config file location, if the platform has one.
fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ifacegen").map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Validate a config after parsing.
pub fn validate(config: &Config) -> std::result::Result<(), String> {
    for name in &config.exclude {
        if !IDENTIFIER.is_match(name) {
            return Err(format!("exclude entry {:?} is not a Go identifier", name));
        }
    }
    Ok(())
}
