//! Output helpers shared by the renderer and command handlers.

pub mod progress;
pub mod table;

use console::{style, StyledObject};
use serde::Serialize;
use std::io::{self, Write};

use crate::domain::models::assessment::ScoreBand;

/// Truncate to `max_chars` characters, appending "..." when shortened.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

/// `7.5/10`, `9/10`; whole scores print without a fraction.
pub fn score_badge(score: f64) -> String {
    format!("{}/10", format_number(score))
}

pub fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Badge colored by band: red low, yellow medium, green high.
pub fn colored_badge(score: f64) -> StyledObject<String> {
    let badge = score_badge(score);
    match ScoreBand::of(score) {
        ScoreBand::Low => style(badge).red().bold(),
        ScoreBand::Medium => style(badge).yellow().bold(),
        ScoreBand::High => style(badge).green().bold(),
    }
}

/// Write one line to stdout; a closed pipe is not an error.
pub fn print_line(line: impl AsRef<str>) {
    write_line(&mut io::stdout().lock(), line.as_ref());
}

/// Write one line to stderr; a closed pipe is not an error.
pub fn eprint_line(line: impl AsRef<str>) {
    write_line(&mut io::stderr().lock(), line.as_ref());
}

fn write_line(out: &mut impl Write, line: &str) {
    // Output is best effort once the reader has gone away.
    let _ = writeln!(out, "{line}").and_then(|()| out.flush());
}

/// One JSON document per line on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => print_line(json),
        Err(err) => tracing::error!(error = %err, "failed to serialize output"),
    }
}
