//! Configuration file
//!
//! The file is optional and every key has a default, so `{}` is a valid
//! configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::is_known_level;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Worker threads used by `info` (default 1)
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Quarantine coercion failures instead of aborting (default true)
    #[serde(default = "default_skip_failures")]
    pub skip_failures: bool,

    /// Cast every known field to its declared kind on import (default false)
    #[serde(default)]
    pub force_cast: bool,

    /// Keep extraneous fields when normalizing (default false)
    #[serde(default)]
    pub keep_extraneous: bool,

    /// Log level used when neither --log-level nor RUST_LOG is set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_threads() -> usize {
    1
}
fn default_skip_failures() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            skip_failures: default_skip_failures(),
            force_cast: false,
            keep_extraneous: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// The file at `path`, or the defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.threads == 0 {
            return Err(CliError::config_error("threads must be > 0"));
        }

        if !is_known_level(&self.log_level) {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'",
                self.log_level
            )));
        }

        Ok(())
    }
}
