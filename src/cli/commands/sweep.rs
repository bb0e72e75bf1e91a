//! Sweep command - terminate expired sessions once

use crate::cli::args::SweepArgs;
use crate::config::Config;
use crate::error::{WsmError, WsmResult};
use crate::storage::StorageMedia;
use crate::ui::{self, Status, UiContext};
use std::time::Duration;

/// Execute the sweep command
pub async fn execute(args: SweepArgs, config: &Config) -> WsmResult<()> {
    let ctx = UiContext::detect();
    let lifetime = match args.max_lifetime {
        Some(0) => {
            return Err(WsmError::InvalidSetting(
                "max lifetime must be at least one second".to_string(),
            ))
        }
        Some(secs) => Duration::from_secs(secs),
        None => config.session.max_lifetime(),
    };

    let storage = super::open_file_storage(config).await?;
    let before = storage.active_sessions().await;
    storage.terminate_session_on_expiration(lifetime).await;
    let after = storage.active_sessions().await;

    ui::step_detail(
        &ctx,
        Status::Ok,
        &format!("Terminated {} expired session(s)", before.saturating_sub(after)),
        &format!("{} remaining", after),
    );

    Ok(())
}
