//! Error types for wsm
//!
//! All modules use `WsmResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wsm operations
pub type WsmResult<T> = Result<T, WsmError>;

/// All errors that can occur in wsm
#[derive(Error, Debug)]
pub enum WsmError {
    // Session errors
    #[error("wsm: session does not exist")]
    SessionNotExist,

    #[error("wsm: malformed session cookie: {0}")]
    MalformedCookie(String),

    #[error("wsm: secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    // Configuration errors
    #[error("wsm: unsupported storage media type {requested}, the supported storage media types are [{supported}]")]
    UnsupportedStorageType { requested: String, supported: String },

    #[error("wsm: invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl WsmError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the caller should answer this error by issuing a fresh session
    ///
    /// A stale or forged cookie is reported rather than silently replaced;
    /// this lets the application opt into recovery.
    pub fn warrants_new_session(&self) -> bool {
        matches!(self, Self::SessionNotExist | Self::MalformedCookie(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedStorageType { .. } => {
                Some("Set storage.kind with: wsm config set storage.kind memory")
            }
            Self::SessionNotExist | Self::MalformedCookie(_) => {
                Some("Discard the client cookie and start a fresh session")
            }
            Self::RandomnessUnavailable(_) => {
                Some("Check that the operating system entropy source is readable")
            }
            Self::ConfigInvalid { .. } => Some("Run: wsm config init --force"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = WsmError::SessionNotExist;
        assert_eq!(err.to_string(), "wsm: session does not exist");
    }

    #[test]
    fn unsupported_storage_lists_supported_types() {
        let err = WsmError::UnsupportedStorageType {
            requested: "redis".to_string(),
            supported: "memory, file".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("redis"));
        assert!(message.contains("memory, file"));
    }

    #[test]
    fn error_hint() {
        let err = WsmError::RandomnessUnavailable("EIO".to_string());
        assert!(err.hint().is_some());
        assert!(WsmError::Internal("x".to_string()).hint().is_none());
    }

    #[test]
    fn stale_cookies_warrant_new_session() {
        assert!(WsmError::SessionNotExist.warrants_new_session());
        assert!(WsmError::MalformedCookie("bad".to_string()).warrants_new_session());
        assert!(!WsmError::RandomnessUnavailable("x".to_string()).warrants_new_session());
    }
}
