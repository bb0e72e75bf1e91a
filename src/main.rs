//! wsm - Web Sessions Manager
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wsm::cli::{commands, Cli, Commands};
use wsm::config::ConfigManager;
use wsm::error::WsmResult;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> WsmResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("wsm=warn"),
        1 => EnvFilter::new("wsm=info"),
        _ => EnvFilter::new("wsm=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Backends => commands::backends(&config).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
        Commands::List(args) => commands::list(args, &config).await,
        Commands::Sweep(args) => commands::sweep(args, &config).await,
        Commands::Demo => commands::demo(&config).await,
    }
}
