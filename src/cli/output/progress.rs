//! Spinner shown while an analysis is in flight.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::domain::models::PipelineState;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Spinner drawing to stderr; hidden when stderr is not a terminal.
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style.tick_chars(SPINNER_CHARS));
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Spinner text for an in-flight pipeline state.
pub const fn state_message(state: PipelineState) -> Option<&'static str> {
    match state {
        PipelineState::Extracting => Some("Reading product details..."),
        PipelineState::Analyzing => Some("Analyzing sustainability..."),
        PipelineState::Validating => Some("Checking the analysis..."),
        PipelineState::Idle | PipelineState::Displaying | PipelineState::Error(_) => None,
    }
}

pub trait ProgressBarExt {
    fn finish_success(&self, message: impl Into<String>);
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✗ {}", message.into()));
    }
}
