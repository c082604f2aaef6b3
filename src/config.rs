//! Configuration for Rustack behavior.
//!
//! Settings merge from, lowest precedence first: built-in defaults, a
//! `rustack.toml` file (explicit path or the working directory), and
//! `RUSTACK_*` environment variables. Command-line flags override all of
//! these at the call site.

use crate::core::Environment;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "rustack.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings for synthesis output.
    pub defaults: Defaults,

    /// Target environment stacks synthesize against.
    pub environment: Environment,
}

/// Default output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Output format: `yaml` or `json`.
    pub format: String,

    /// Directory templates are written to instead of stdout, when set.
    pub output_dir: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            format: "yaml".to_string(),
            output_dir: None,
        }
    }
}

impl Config {
    /// Loads configuration, merging file and environment sources.
    ///
    /// An explicit `path` must exist; the implicit `./rustack.toml` is
    /// optional.
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::FileNotFound(path.clone()));
                }
                Self::from_file(path)?
            }
            None => {
                let implicit = Path::new(CONFIG_FILE_NAME);
                if implicit.exists() {
                    Self::from_file(implicit)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML configuration file.
    fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Applies `RUSTACK_*` environment variable overrides.
    fn apply_env(&mut self) {
        if let Ok(region) = std::env::var("RUSTACK_REGION") {
            self.environment.region = region;
        }
        if let Ok(zones) = std::env::var("RUSTACK_AVAILABILITY_ZONES") {
            if let Ok(count) = zones.parse() {
                self.environment.availability_zones = count;
            }
        }
        if let Ok(format) = std::env::var("RUSTACK_FORMAT") {
            self.defaults.format = format;
        }
    }

    /// Rejects values that cannot produce a usable synthesis.
    fn validate(&self) -> Result<()> {
        if self.environment.availability_zones == 0 {
            return Err(Error::InvalidConfig {
                key: "environment.availability_zones".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.environment.region.is_empty() {
            return Err(Error::InvalidConfig {
                key: "environment.region".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        match self.defaults.format.as_str() {
            "yaml" | "json" => Ok(()),
            other => Err(Error::InvalidConfig {
                key: "defaults.format".to_string(),
                message: format!("unknown format '{other}', expected 'yaml' or 'json'"),
            }),
        }
    }
}
