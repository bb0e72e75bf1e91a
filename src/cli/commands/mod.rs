//! CLI command implementations

pub mod backends;
pub mod config;
pub mod demo;
pub mod list;
pub mod sweep;

pub use backends::execute as backends;
pub use config::execute as config;
pub use demo::execute as demo;
pub use list::execute as list;
pub use sweep::execute as sweep;

use crate::config::{Config, ConfigManager};
use crate::error::{WsmError, WsmResult};
use crate::storage::{FileStorage, StorageKind};

/// Open the file storage named by the configuration
///
/// Memory sessions live only inside the serving process, so commands that
/// inspect storage from the outside require `storage.kind = "file"`.
pub(crate) async fn open_file_storage(config: &Config) -> WsmResult<FileStorage> {
    match config.storage.kind.parse::<StorageKind>()? {
        StorageKind::File => FileStorage::open(ConfigManager::sessions_dir(&config.storage)).await,
        StorageKind::Memory => Err(WsmError::User(
            "Memory sessions are only reachable from the serving process; set storage.kind = \"file\""
                .to_string(),
        )),
    }
}
