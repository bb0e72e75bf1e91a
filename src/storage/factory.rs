//! Storage factory for creating storage media by name
//!
//! Maps the configured `storage.kind` string to a backend constructor.

use crate::config::{ConfigManager, StorageConfig};
use crate::error::{WsmError, WsmResult};
use crate::storage::file::FileStorage;
use crate::storage::media::StorageMediaRef;
use crate::storage::memory::MemoryStorage;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Built-in storage media types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// In-process map, lost on restart
    Memory,
    /// One JSON document per session on disk
    File,
}

impl StorageKind {
    /// All supported kinds, in display order
    pub const ALL: [StorageKind; 2] = [StorageKind::Memory, StorageKind::File];

    /// Get the configuration key for this kind
    pub fn name(&self) -> &'static str {
        match self {
            StorageKind::Memory => "memory",
            StorageKind::File => "file",
        }
    }

    /// Short description for listings
    pub fn description(&self) -> &'static str {
        match self {
            StorageKind::Memory => "in-process map, sessions are lost on restart",
            StorageKind::File => "one JSON document per session under the state directory",
        }
    }

    /// Comma-separated list of supported names
    pub fn supported() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StorageKind {
    type Err = WsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let requested = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == requested)
            .ok_or_else(|| WsmError::UnsupportedStorageType {
                requested,
                supported: Self::supported(),
            })
    }
}

/// Create the storage media for `kind`
///
/// # Arguments
/// * `kind` - The storage media type
/// * `config` - Storage settings (state directory for file sessions)
pub async fn create_storage(kind: StorageKind, config: &StorageConfig) -> WsmResult<StorageMediaRef> {
    match kind {
        StorageKind::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageKind::File => {
            let storage = FileStorage::open(ConfigManager::sessions_dir(config)).await?;
            Ok(Arc::new(storage))
        }
    }
}
