//! # Validation Options
//!
//! Structural validity has no depth limit of its own. Services that validate
//! untrusted input can cap the walk through [`ValidationOptions::max_depth`],
//! set in code or loaded from a YAML/JSON config file:
//!
//! ```yaml
//! max_depth: 32
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options for a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationOptions {
    /// No value may sit deeper than `max_depth`: a non-empty container at
    /// level `max_depth` is reported instead of walked. The root is level 0.
    /// `None` walks the whole tree.
    pub max_depth: Option<usize>,
}

/// Error loading [`ValidationOptions`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config source could not be parsed.
    #[error("config parse error for '{source_name}': {reason}")]
    Parse {
        /// File path, or `<inline>` for string sources.
        source_name: String,
        /// Reason the config was rejected.
        reason: String,
    },

    /// IO error reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

const INLINE: &str = "<inline>";

impl ValidationOptions {
    /// Options with no depth limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the walk at `max_depth`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Parse options from YAML text.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        parse_yaml(s, INLINE)
    }

    /// Parse options from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        parse_json(s, INLINE)
    }

    /// Load options from a file. `.yaml` / `.yml` are read as YAML,
    /// anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it does not describe valid options.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let source_name = path.display().to_string();

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let options = match ext {
            "yaml" | "yml" => parse_yaml(&content, &source_name)?,
            _ => parse_json(&content, &source_name)?,
        };
        tracing::debug!(path = %source_name, max_depth = ?options.max_depth, "loaded validation options");
        Ok(options)
    }
}

fn parse_yaml(s: &str, source_name: &str) -> Result<ValidationOptions, ConfigError> {
    serde_yaml::from_str(s).map_err(|e| ConfigError::Parse {
        source_name: source_name.to_string(),
        reason: format!("invalid YAML: {e}"),
    })
}

fn parse_json(s: &str, source_name: &str) -> Result<ValidationOptions, ConfigError> {
    serde_json::from_str(s).map_err(|e| ConfigError::Parse {
        source_name: source_name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}
