//! Step and detail lines for command output

use super::context::UiContext;
use console::style;

/// Outcome shown in front of a step line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Info,
    Warn,
    Fail,
}

impl Status {
    fn tag(self) -> String {
        match self {
            Status::Ok => style("[OK]").green().to_string(),
            Status::Info => style("[INFO]").cyan().to_string(),
            Status::Warn => style("[WARN]").yellow().to_string(),
            Status::Fail => style("[FAIL]").red().to_string(),
        }
    }
}

/// Section title
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.framed() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}\n", style(title).cyan().bold());
    }
}

/// One step line
pub fn step(ctx: &UiContext, status: Status, message: &str) {
    if !ctx.framed() {
        println!("  {} {}", status.tag(), message);
        return;
    }

    match status {
        Status::Ok => cliclack::log::success(message),
        Status::Info => cliclack::log::info(message),
        Status::Warn => cliclack::log::warning(message),
        Status::Fail => cliclack::log::error(message),
    }
    .ok();
}

/// Step line with a dimmed detail, e.g. a path or a count
pub fn step_detail(ctx: &UiContext, status: Status, message: &str, detail: &str) {
    let detail = if ctx.framed() {
        style(detail).dim().to_string()
    } else {
        detail.to_string()
    };
    step(ctx, status, &format!("{} ({})", message, detail));
}

/// Dimmed follow-up line
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.framed() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

/// `key: value` line
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}
