//! Backends command - list supported storage media

use crate::config::Config;
use crate::error::WsmResult;
use crate::storage::StorageKind;
use console::style;

/// Execute the backends command
pub async fn execute(config: &Config) -> WsmResult<()> {
    let configured = config.storage.kind.parse::<StorageKind>().ok();

    for kind in StorageKind::ALL {
        let marker = if Some(kind) == configured { "*" } else { " " };
        println!(
            "{} {:<8} {}",
            marker,
            style(kind.name()).cyan(),
            style(kind.description()).dim()
        );
    }

    Ok(())
}
