//! Storage registration record
//!
//! Remembers which storage media type was last used so a switch between
//! backends is noticed. Sessions held by the previous backend are not
//! migrated; the change is only reported.

use crate::error::{WsmError, WsmResult};
use crate::storage::StorageKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Persisted record of the registered storage type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageRegistration {
    /// Storage media type name
    #[serde(rename = "type")]
    pub storage_type: String,

    /// When this type was registered
    pub registered_at: DateTime<Utc>,
}

/// Result of registering a storage type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// No record existed
    New,
    /// The recorded type matches
    Unchanged,
    /// The recorded type differs and has been replaced
    Changed { previous: String },
}

impl StorageRegistration {
    /// Load the record at `path`, if present
    pub async fn load(path: &Path) -> WsmResult<Option<Self>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WsmError::io(
                format!("reading storage registration {}", path.display()),
                e,
            )),
        }
    }

    async fn save(&self, path: &Path) -> WsmResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| WsmError::io("creating state directory", e))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await.map_err(|e| {
            WsmError::io(format!("writing storage registration {}", path.display()), e)
        })
    }
}

/// Record `kind` at `path`, reporting how it relates to the previous record
///
/// An unreadable record is treated as absent and overwritten.
pub async fn register(path: &Path, kind: StorageKind) -> WsmResult<RegistrationOutcome> {
    let previous = match StorageRegistration::load(path).await {
        Ok(record) => record,
        Err(WsmError::Json(e)) => {
            warn!(path = %path.display(), error = %e, "discarding unreadable storage registration");
            None
        }
        Err(e) => return Err(e),
    };

    let outcome = match previous {
        None => RegistrationOutcome::New,
        Some(record) if record.storage_type == kind.name() => {
            debug!(storage = kind.name(), "storage registration unchanged");
            return Ok(RegistrationOutcome::Unchanged);
        }
        Some(record) => RegistrationOutcome::Changed {
            previous: record.storage_type,
        },
    };

    if let RegistrationOutcome::Changed { previous } = &outcome {
        warn!(
            previous = %previous,
            current = kind.name(),
            "storage media type changed; sessions in the previous storage are not migrated"
        );
    }

    StorageRegistration {
        storage_type: kind.name().to_string(),
        registered_at: Utc::now(),
    }
    .save(path)
    .await?;

    Ok(outcome)
}
