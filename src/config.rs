//! Configuration for pyscope.
//!
//! Configuration is optional. When present it is a YAML file, either given
//! with `--config` or discovered in the current directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::{BranchQuery, DEFAULT_BRANCH_KINDS};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["pyscope.yaml", ".pyscope.yaml"];

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Replaces the default branch node kinds when set.
    #[serde(default)]
    pub branch_kinds: Option<Vec<String>>,
    /// Appended to the branch node kinds.
    #[serde(default)]
    pub extra_branch_kinds: Vec<String>,
    /// Editor actions refuse files without a `.py`/`.pyi` extension (default: true).
    #[serde(default = "default_true")]
    pub require_python_extension: bool,
    /// Drop `self` from reported parameter lists (default: true).
    #[serde(default = "default_true")]
    pub skip_self_parameter: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            branch_kinds: None,
            extra_branch_kinds: Vec::new(),
            require_python_extension: true,
            skip_self_parameter: true,
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        // An empty file deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from an explicit path, or discover one in `dir`.
    ///
    /// Falls back to defaults when nothing is found.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::parse_file(path)?,
            None => match discover(dir) {
                Some(path) => Self::parse_file(path)?,
                None => Self::default(),
            },
        };
        validate(&config)?;
        Ok(config)
    }

    /// Effective branch node kinds, without duplicates.
    pub fn branch_kinds(&self) -> Vec<String> {
        let base: Vec<String> = match &self.branch_kinds {
            Some(kinds) => kinds.clone(),
            None => DEFAULT_BRANCH_KINDS.iter().map(|k| k.to_string()).collect(),
        };

        let mut kinds: Vec<String> = Vec::with_capacity(base.len() + self.extra_branch_kinds.len());
        for kind in base.into_iter().chain(self.extra_branch_kinds.iter().cloned()) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    for kind in config.branch_kinds() {
        if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Invalid(format!(
                "branch kind {:?} is not a node kind name",
                kind
            )));
        }
    }

    // Compiling the query checks the kinds against the grammar.
    BranchQuery::new(&config.branch_kinds())
        .map_err(|e| ConfigError::Invalid(format!("unknown branch kind: {}", e)))?;

    Ok(())
}
