//! Sustainability assessment schema.
//!
//! Field names follow the JSON shape requested from the analysis service and
//! persisted in history/cart state, hence the camelCase renames.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lowest allowed score.
pub const MIN_SCORE: f64 = 1.0;
/// Highest allowed score.
pub const MAX_SCORE: f64 = 10.0;

/// Quick summary shown when the service returned none.
pub const DEFAULT_SUMMARY: &str = "Analysis complete. See details below.";

/// One of the five scored sustainability categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreCategory {
    Production,
    Materials,
    Transportation,
    Packaging,
    EndOfLife,
}

impl ScoreCategory {
    pub const ALL: [Self; 5] = [
        Self::Production,
        Self::Materials,
        Self::Transportation,
        Self::Packaging,
        Self::EndOfLife,
    ];

    /// Key used in the JSON payload.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Materials => "materials",
            Self::Transportation => "transportation",
            Self::Packaging => "packaging",
            Self::EndOfLife => "endOfLife",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Production => "Production Emissions",
            Self::Materials => "Materials Sourcing",
            Self::Transportation => "Transportation",
            Self::Packaging => "Packaging",
            Self::EndOfLife => "End of Life",
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Estimated footprint of the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonFootprint {
    #[serde(rename = "kgCO2e")]
    pub kg_co2e: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comparison: String,
}

/// Per-category scores, each in `[1, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub production: f64,
    pub materials: f64,
    pub transportation: f64,
    pub packaging: f64,
    pub end_of_life: f64,
}

impl Scores {
    /// Same score in every category.
    pub const fn uniform(score: f64) -> Self {
        Self {
            production: score,
            materials: score,
            transportation: score,
            packaging: score,
            end_of_life: score,
        }
    }

    pub const fn get(&self, category: ScoreCategory) -> f64 {
        match category {
            ScoreCategory::Production => self.production,
            ScoreCategory::Materials => self.materials,
            ScoreCategory::Transportation => self.transportation,
            ScoreCategory::Packaging => self.packaging,
            ScoreCategory::EndOfLife => self.end_of_life,
        }
    }

    pub fn set(&mut self, category: ScoreCategory, value: f64) {
        match category {
            ScoreCategory::Production => self.production = value,
            ScoreCategory::Materials => self.materials = value,
            ScoreCategory::Transportation => self.transportation = value,
            ScoreCategory::Packaging => self.packaging = value,
            ScoreCategory::EndOfLife => self.end_of_life = value,
        }
    }
}

/// Educational detail for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDetail {
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub insight: String,
    #[serde(default)]
    pub tips: String,
}

/// Validated result of one product analysis.
///
/// `overall` also accepts the legacy `score` key so that state written by
/// older releases keeps loading. When both are stored, `overall` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredAssessment")]
pub struct Assessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_footprint: Option<CarbonFootprint>,
    pub scores: Scores,
    pub overall: f64,
    #[serde(default)]
    pub quick_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_details: Option<BTreeMap<ScoreCategory, CategoryDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

/// On-disk shape of an [`Assessment`], tolerant of the legacy `score` key.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAssessment {
    #[serde(default)]
    carbon_footprint: Option<CarbonFootprint>,
    scores: Scores,
    #[serde(default)]
    overall: Option<f64>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    quick_summary: String,
    #[serde(default)]
    category_details: Option<BTreeMap<ScoreCategory, CategoryDetail>>,
    #[serde(default)]
    recommendations: Option<String>,
}

impl TryFrom<StoredAssessment> for Assessment {
    type Error = String;

    fn try_from(stored: StoredAssessment) -> Result<Self, Self::Error> {
        let overall = stored
            .overall
            .or(stored.score)
            .ok_or_else(|| "missing field `overall`".to_string())?;
        Ok(Self {
            carbon_footprint: stored.carbon_footprint,
            scores: stored.scores,
            overall,
            quick_summary: stored.quick_summary,
            category_details: stored.category_details,
            recommendations: stored.recommendations,
        })
    }
}

impl Assessment {
    /// Minimal assessment with uniform scores; mostly useful for tests and fixtures.
    pub fn new(overall: f64, scores: Scores) -> Self {
        Self {
            carbon_footprint: None,
            scores,
            overall,
            quick_summary: String::new(),
            category_details: None,
            recommendations: None,
        }
    }

    #[must_use]
    pub fn with_carbon(mut self, kg_co2e: f64) -> Self {
        self.carbon_footprint = Some(CarbonFootprint {
            kg_co2e,
            description: String::new(),
            comparison: String::new(),
        });
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.quick_summary = summary.into();
        self
    }

    /// Carbon figure, or zero when the assessment has none.
    pub fn carbon_kg(&self) -> f64 {
        self.carbon_footprint.as_ref().map_or(0.0, |c| c.kg_co2e)
    }

    pub fn summary_or_default(&self) -> &str {
        if self.quick_summary.trim().is_empty() {
            DEFAULT_SUMMARY
        } else {
            &self.quick_summary
        }
    }

    pub fn detail(&self, category: ScoreCategory) -> Option<&CategoryDetail> {
        self.category_details.as_ref()?.get(&category)
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.overall)
    }
}

/// Display band of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl ScoreBand {
    /// `<= 4` is low, `<= 7` is medium, anything above is high.
    pub fn of(score: f64) -> Self {
        if score <= 4.0 {
            Self::Low
        } else if score <= 7.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Clamp a score into `[MIN_SCORE, MAX_SCORE]`.
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(MIN_SCORE, MAX_SCORE)
}
