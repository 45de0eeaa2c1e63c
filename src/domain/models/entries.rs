//! History and cart records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assessment::Assessment;

/// Maximum number of retained history entries.
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// One completed analysis, most-recent-first in the `history` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub url: String,
    pub analysis: Assessment,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>, analysis: Assessment) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            analysis,
            timestamp: Utc::now(),
        }
    }
}

/// A product the user put in the cart; unique by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub title: String,
    pub url: String,
    pub analysis: Assessment,
    pub timestamp: DateTime<Utc>,
}

impl CartEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>, analysis: Assessment) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            analysis,
            timestamp: Utc::now(),
        }
    }

    /// Copy a history entry into a cart entry stamped with the current time.
    pub fn from_history(entry: &HistoryEntry) -> Self {
        Self::new(entry.title.clone(), entry.url.clone(), entry.analysis.clone())
    }
}

/// Derived, read-only cart statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub count: usize,
    /// Mean overall score rounded to one decimal; `None` for an empty cart.
    pub average_overall: Option<f64>,
    /// Sum of carbon figures rounded to one decimal.
    pub total_carbon_kg: f64,
}

impl CartSummary {
    #[allow(clippy::cast_precision_loss)]
    pub fn of(entries: &[CartEntry]) -> Self {
        let count = entries.len();
        let average_overall = if count == 0 {
            None
        } else {
            let sum: f64 = entries.iter().map(|e| e.analysis.overall).sum();
            Some(round_one_decimal(sum / count as f64))
        };
        let total_carbon_kg = round_one_decimal(entries.iter().map(|e| e.analysis.carbon_kg()).sum());

        Self {
            count,
            average_overall,
            total_carbon_kg,
        }
    }
}

/// Round half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::assessment::Scores;

    fn entry(url: &str, overall: f64, carbon: Option<f64>) -> CartEntry {
        let mut analysis = Assessment::new(overall, Scores::uniform(overall));
        if let Some(kg) = carbon {
            analysis = analysis.with_carbon(kg);
        }
        CartEntry::new("Item", url, analysis)
    }

    #[test]
    fn test_empty_cart_summary() {
        let summary = CartSummary::of(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.average_overall.is_none());
        assert!(summary.total_carbon_kg.abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_rounds_to_one_decimal() {
        let entries = vec![
            entry("u1", 9.0, Some(1.26)),
            entry("u2", 6.0, None),
            entry("u3", 7.1, Some(3.0)),
        ];
        let summary = CartSummary::of(&entries);
        assert_eq!(summary.count, 3);
        // (9.0 + 6.0 + 7.1) / 3 = 7.366..
        assert_eq!(summary.average_overall, Some(7.4));
        assert!((summary.total_carbon_kg - 4.3).abs() < 1e-9);
    }

    #[test]
    fn test_cart_entry_from_history_keeps_identity() {
        let history = HistoryEntry::new(
            "Steel bottle",
            "https://shop.example/bottle",
            Assessment::new(8.0, Scores::uniform(8.0)),
        );
        let cart = CartEntry::from_history(&history);
        assert_eq!(cart.url, history.url);
        assert_eq!(cart.title, history.title);
        assert_eq!(cart.analysis, history.analysis);
    }

    #[test]
    fn test_history_entry_reads_iso_timestamp() {
        let json = r#"{
            "title": "Mug",
            "url": "https://shop.example/mug",
            "analysis": {"scores": {"production": 3, "materials": 3, "transportation": 3, "packaging": 3, "endOfLife": 3}, "score": 3},
            "timestamp": "2024-05-01T10:20:30.000Z"
        }"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.timestamp.to_rfc3339(), "2024-05-01T10:20:30+00:00");
        assert!((entry.analysis.overall - 3.0).abs() < f64::EPSILON);
    }
}
