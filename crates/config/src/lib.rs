#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for lnf
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/lnf/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;
pub mod sections;
pub mod resources_semaphore;

pub use sections::{GeneralConfig, OutputConfig, ResolveConfig, StoreConfig};

use lnf_errors::{ConfigError, Error};
use lnf_types::path::{is_within, segments};
use lnf_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("lnf").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // LNF_OUTPUT
        if let Ok(output) = std::env::var("LNF_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "LNF_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // LNF_COLOR
        if let Ok(color) = std::env::var("LNF_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "LNF_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // LNF_WORKERS
        if let Ok(workers) = std::env::var("LNF_WORKERS") {
            self.resolve.workers = workers.parse().map_err(|_| ConfigError::InvalidValue {
                field: "LNF_WORKERS".to_string(),
                value: workers,
            })?;
        }

        // LNF_STORE_ROOT
        if let Ok(root) = std::env::var("LNF_STORE_ROOT") {
            if root.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "LNF_STORE_ROOT".to_string(),
                    value: root,
                }
                .into());
            }
            self.store.local_root = Some(PathBuf::from(root));
        }

        // LNF_CHECKPOINT
        if let Ok(checkpoint) = std::env::var("LNF_CHECKPOINT") {
            self.output.checkpoint = PathBuf::from(checkpoint);
        }

        Ok(())
    }

    /// Check cross-field invariants
    ///
    /// # Errors
    ///
    /// Returns an error when the technology list is empty or repeats a
    /// token, when the roots are not absolute, or when the holding
    /// collection does not sit under the canonical root.
    pub fn validate(&self) -> Result<(), Error> {
        if self.resolve.technologies.is_empty() {
            return Err(ConfigError::Invalid {
                message: "resolve.technologies must name at least one technology".to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for tech in &self.resolve.technologies {
            if !seen.insert(*tech) {
                return Err(ConfigError::InvalidValue {
                    field: "resolve.technologies".to_string(),
                    value: tech.to_string(),
                }
                .into());
            }
        }

        for (field, value) in [
            ("store.canonical_root", &self.store.canonical_root),
            ("store.holding_collection", &self.store.holding_collection),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                }
                .into());
            }
        }

        if !is_within(&self.store.holding_collection, &self.store.canonical_root) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "holding collection {} is not under canonical root {}",
                    self.store.holding_collection, self.store.canonical_root
                ),
            }
            .into());
        }

        let holding_depth = segments(&self.store.holding_collection).len();
        if self.store.holding_prefix_depth < holding_depth {
            return Err(ConfigError::InvalidValue {
                field: "store.holding_prefix_depth".to_string(),
                value: self.store.holding_prefix_depth.to_string(),
            }
            .into());
        }

        if self.store.checksum_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.checksum_key".to_string(),
                value: String::new(),
            }
            .into());
        }

        Ok(())
    }

    /// Root directory for the local store backend (with default)
    #[must_use]
    pub fn local_root(&self) -> PathBuf {
        self.store
            .local_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("/"))
    }
}

/// Calculate worker count based on CPU count
#[must_use]
pub fn calculate_workers(config_value: usize) -> usize {
    if config_value > 0 {
        config_value // User override
    } else {
        // Store calls are I/O bound; oversubscribe the CPUs
        (num_cpus::get() * 2).max(1)
    }
}
