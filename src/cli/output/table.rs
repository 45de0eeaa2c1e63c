//! comfy-table builders for cart, history and score breakdowns.

use chrono::Local;
use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use super::{format_number, score_badge, truncate};
use crate::domain::models::assessment::ScoreBand;
use crate::domain::models::{Assessment, CartEntry, HistoryEntry, ScoreCategory};

/// Cart titles are cut at this many characters.
pub const CART_TITLE_CHARS: usize = 35;
/// History titles are cut at this many characters.
pub const HISTORY_TITLE_CHARS: usize = 50;

pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub const fn plain() -> Self {
        Self { use_colors: false }
    }

    fn base_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                headers
                    .iter()
                    .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
            );
        if !self.use_colors {
            table.force_no_tty();
        }
        table
    }

    fn score_cell(&self, score: f64) -> Cell {
        let cell = Cell::new(score_badge(score)).set_alignment(CellAlignment::Right);
        if self.use_colors {
            cell.fg(band_color(ScoreBand::of(score)))
        } else {
            cell
        }
    }

    pub fn format_cart(&self, entries: &[CartEntry]) -> String {
        let mut table = self.base_table(&["#", "Product", "Score", "Carbon"]);
        for (index, entry) in entries.iter().enumerate() {
            let carbon = entry.analysis.carbon_footprint.as_ref().map_or_else(
                || "N/A".to_string(),
                |c| format!("{} kg CO₂e", format_number(c.kg_co2e)),
            );
            table.add_row(vec![
                Cell::new(index),
                Cell::new(truncate(&entry.title, CART_TITLE_CHARS)),
                self.score_cell(entry.analysis.overall),
                Cell::new(carbon),
            ]);
        }
        table.to_string()
    }

    pub fn format_history(&self, entries: &[HistoryEntry]) -> String {
        let mut table = self.base_table(&["Product", "Score", "Date"]);
        for entry in entries {
            table.add_row(vec![
                Cell::new(truncate(&entry.title, HISTORY_TITLE_CHARS)),
                self.score_cell(entry.analysis.overall),
                Cell::new(entry.timestamp.with_timezone(&Local).format("%Y-%m-%d")),
            ]);
        }
        table.to_string()
    }

    pub fn format_breakdown(&self, assessment: &Assessment) -> String {
        let mut table = self.base_table(&["Category", "Score", "Rating"]);
        for category in ScoreCategory::ALL {
            let score = assessment.scores.get(category);
            table.add_row(vec![
                Cell::new(category.label()),
                self.score_cell(score),
                Cell::new(band_label(ScoreBand::of(score))),
            ]);
        }
        table.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

const fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Low => Color::Red,
        ScoreBand::Medium => Color::Yellow,
        ScoreBand::High => Color::Green,
    }
}

pub const fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Low => "low",
        ScoreBand::Medium => "medium",
        ScoreBand::High => "high",
    }
}

/// Respects `NO_COLOR` and `TERM=dumb`.
fn supports_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
        && console::Term::stdout().features().colors_supported()
}
