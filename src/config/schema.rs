//! Configuration schema for wsm
//!
//! Configuration is stored at `~/.config/wsm/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Session cookie and lifetime settings
    pub session: SessionConfig,

    /// Storage media settings
    pub storage: StorageConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session identifier
    pub cookie_name: String,

    /// Maximum idle lifetime of a session, in seconds
    pub max_lifetime_secs: u64,

    /// Period of the expiration sweep in seconds (defaults to the max lifetime)
    pub sweep_interval_secs: Option<u64>,
}

impl SessionConfig {
    /// Maximum lifetime as a duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    /// Effective sweep period
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.unwrap_or(self.max_lifetime_secs))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "wsm_session".to_string(),
            max_lifetime_secs: 3600,
            sweep_interval_secs: None,
        }
    }
}

/// Storage media configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage media type: "memory" or "file"
    pub kind: String,

    /// Root directory for file sessions and the registration record
    pub state_dir: Option<PathBuf>,

    /// Record the storage type in use and warn when it changes
    pub track_registration: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: "memory".to_string(),
            state_dir: None,
            track_registration: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[session]"));
        assert!(toml.contains("[storage]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.session.cookie_name, "wsm_session");
        assert_eq!(config.storage.kind, "memory");
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [session]
            max_lifetime_secs = 2
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.session.max_lifetime(), Duration::from_secs(2));
        assert_eq!(config.session.cookie_name, "wsm_session"); // default preserved
    }

    #[test]
    fn sweep_interval_defaults_to_lifetime() {
        let mut session = SessionConfig {
            max_lifetime_secs: 90,
            ..SessionConfig::default()
        };
        assert_eq!(session.sweep_interval(), Duration::from_secs(90));

        session.sweep_interval_secs = Some(15);
        assert_eq!(session.sweep_interval(), Duration::from_secs(15));
    }
}
