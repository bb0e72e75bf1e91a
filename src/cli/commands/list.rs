//! List command - show sessions held by the file storage

use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::WsmResult;
use crate::session::state::is_expired;
use crate::session::SessionRecord;
use crate::ui::{self, Status, UiContext};
use chrono::Utc;
use console::style;
use serde::Serialize;

/// Session listing row; identifiers are shortened
#[derive(Serialize)]
struct SessionRow {
    id: String,
    created_at: String,
    last_access: String,
    keys: usize,
    expired: bool,
}

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> WsmResult<()> {
    let storage = super::open_file_storage(config).await?;
    let records = storage.list_records().await?;
    let rows = to_rows(&records, config);

    if rows.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step(&ctx, Status::Info, "No stored sessions");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => rows.iter().for_each(|row| println!("{}", row.id)),
    }

    Ok(())
}

fn to_rows(records: &[SessionRecord], config: &Config) -> Vec<SessionRow> {
    let now = Utc::now();
    let lifetime = config.session.max_lifetime();

    records
        .iter()
        .map(|record| SessionRow {
            id: format!("{}…", record.id.chars().take(10).collect::<String>()),
            created_at: record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            last_access: record.last_access.format("%Y-%m-%d %H:%M:%S").to_string(),
            keys: record.values.len(),
            expired: is_expired(record.last_access, lifetime, now),
        })
        .collect()
}

fn print_table(rows: &[SessionRow]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Sessions");

    println!(
        "{:<14} {:<20} {:<20} {:<6} {}",
        style("ID").bold(),
        style("CREATED").bold(),
        style("LAST ACCESS").bold(),
        style("KEYS").bold(),
        style("STATE").bold()
    );
    println!("{}", "-".repeat(72));

    for row in rows {
        let state = if row.expired {
            style("expired").dim()
        } else {
            style("live").green()
        };
        println!(
            "{:<14} {:<20} {:<20} {:<6} {}",
            row.id, row.created_at, row.last_access, row.keys, state
        );
    }

    println!();
    println!("{} session(s)", rows.len());
}
