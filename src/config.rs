//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: String,
    #[serde(default = "default_db_file")]
    pub db_file: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_file() -> String {
    "dogdo.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            db_file: default_db_file(),
            max_connections: default_max_connections(),
        }
    }
}

impl StorageConfig {
    /// Resolve the database path. An empty `data_dir` means `~/.dogdo`;
    /// a leading `~/` expands to the home directory.
    pub fn db_path(&self) -> PathBuf {
        let dir = match self.data_dir.trim() {
            "" => dogdo_store::default_data_dir(),
            dir => match dir.strip_prefix("~/") {
                Some(rest) => dirs::home_dir()
                    .map(|home| home.join(rest))
                    .unwrap_or_else(|| PathBuf::from(dir)),
                None => PathBuf::from(dir),
            },
        };
        dir.join(&self.db_file)
    }
}

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
}

fn default_notification_capacity() -> usize {
    256
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            notification_capacity: default_notification_capacity(),
        }
    }
}

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority)
        // prefix_separator("_") so DOGDO_STORAGE__DB_FILE maps to storage.db_file
        .add_source(
            Environment::with_prefix("DOGDO")
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
