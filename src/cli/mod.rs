//! Command-line front end.

pub mod commands;
pub mod output;
pub mod render;
pub mod types;

use console::style;
use serde_json::json;

use crate::domain::errors::EcoError;

// Re-export commonly used items
pub use commands::{dispatch, AppContext};
pub use output::progress::{create_spinner, ProgressBarExt};
pub use render::TerminalRenderer;
pub use types::{Cli, Commands};

/// A pipeline error the renderer has already shown.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Reported(#[from] pub EcoError);

/// Print a command error.
///
/// Errors already shown by the renderer are not printed twice.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) {
    if err.is::<Reported>() {
        return;
    }
    if json_mode {
        output::print_json(&json!({
            "event": "error",
            "kind": "command",
            "message": format!("{err:#}"),
        }));
    } else {
        output::eprint_line(format!("{} {err:#}", style("Error:").red().bold()));
    }
}
