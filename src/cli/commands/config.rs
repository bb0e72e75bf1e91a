//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{WsmError, WsmResult};
use crate::storage::StorageKind;
use crate::ui::{self, Status, UiContext};
use std::path::PathBuf;

const VALID_KEYS: [&str; 7] = [
    "general.log_format",
    "session.cookie_name",
    "session.max_lifetime_secs",
    "session.sweep_interval_secs",
    "storage.kind",
    "storage.state_dir",
    "storage.track_registration",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> WsmResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> WsmResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> WsmResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_detail(
            &ctx,
            Status::Warn,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_detail(
        &ctx,
        Status::Ok,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> WsmResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    if let Err(e) = apply(&mut config, key, value) {
        ui::step_detail(&ctx, Status::Fail, "Cannot set config key", &e.to_string());
        ui::remark(&ctx, "Valid keys:");
        for key in VALID_KEYS {
            ui::remark(&ctx, &format!("  {}", key));
        }
        return Err(e);
    }

    manager.save(&config).await?;
    ui::step(&ctx, Status::Ok, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply a dot-separated key to the configuration
fn apply(config: &mut Config, key: &str, value: &str) -> WsmResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(WsmError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )))
            }
        },

        ["session", "cookie_name"] => config.session.cookie_name = value.to_string(),
        ["session", "max_lifetime_secs"] => config.session.max_lifetime_secs = parse_secs(value)?,
        ["session", "sweep_interval_secs"] => {
            config.session.sweep_interval_secs = Some(parse_secs(value)?)
        }

        ["storage", "kind"] => {
            let kind: StorageKind = value.parse()?;
            config.storage.kind = kind.name().to_string();
        }
        ["storage", "state_dir"] => config.storage.state_dir = Some(PathBuf::from(value)),
        ["storage", "track_registration"] => {
            config.storage.track_registration = parse_bool(value)?
        }

        _ => return Err(WsmError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

fn parse_bool(value: &str) -> WsmResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(WsmError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_secs(value: &str) -> WsmResult<u64> {
    match value.parse::<u64>() {
        Ok(0) | Err(_) => Err(WsmError::User(format!(
            "Invalid number of seconds: {}",
            value
        ))),
        Ok(secs) => Ok(secs),
    }
}
