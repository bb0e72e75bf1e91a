//! CLI output helpers
//!
//! `cliclack` framing on interactive terminals, plain tagged lines in CI and
//! when piped.

mod context;
mod output;

pub use context::UiContext;
pub use output::{intro, key_value, remark, step, step_detail, Status};
