//! Configuration management for wsm

pub mod schema;

pub use schema::{Config, GeneralConfig, SessionConfig, StorageConfig};

use crate::error::{WsmError, WsmResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wsm")
            .join("config.toml")
    }

    /// Get the default state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wsm")
    }

    /// State directory for a storage configuration, honouring `storage.state_dir`
    pub fn storage_root(storage: &StorageConfig) -> PathBuf {
        storage.state_dir.clone().unwrap_or_else(Self::state_dir)
    }

    /// Directory holding file-backed sessions
    pub fn sessions_dir(storage: &StorageConfig) -> PathBuf {
        Self::storage_root(storage).join("sessions")
    }

    /// Path of the storage registration record
    pub fn registration_path(storage: &StorageConfig) -> PathBuf {
        Self::storage_root(storage).join("registered_storage.json")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> WsmResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> WsmResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| WsmError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| WsmError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> WsmResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            WsmError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> WsmResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| WsmError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
