//! Directory Configuration
//!
//! Loads shutdown policy and log level from an optional TOML file layered
//! with `ACTOR_DIRECTORY_*` environment variables. Nested keys use a double
//! underscore, e.g. `ACTOR_DIRECTORY_SHUTDOWN__STOP_TIMEOUT_MS=500`.

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/actor_directory.toml";

/// Top-level configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DirectoryConfig {
    /// How `shutdown` stops the tracked actors
    pub shutdown: ShutdownConfig,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

/// Shutdown policy
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Wait for each actor before stopping the next one
    pub block_on_stop: bool,

    /// Per-actor wait limit; unset waits forever
    pub stop_timeout_ms: Option<u64>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            shutdown: ShutdownConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            block_on_stop: true,
            stop_timeout_ms: None,
        }
    }
}

impl ShutdownConfig {
    pub fn stop_timeout(&self) -> Option<Duration> {
        self.stop_timeout_ms.map(Duration::from_millis)
    }
}

impl DirectoryConfig {
    /// Load configuration from `path` (or the default path) plus environment.
    ///
    /// A missing file is not an error; defaults fill any unset key.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
        if path.exists() {
            info!("Loading actor directory config: {:?}", path);
        } else {
            debug!("Actor directory config not found, using defaults: {:?}", path);
        }

        let config = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("ACTOR_DIRECTORY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
