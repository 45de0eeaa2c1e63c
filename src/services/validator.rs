//! Turns the analysis service's free-form reply into an [`Assessment`].
//!
//! The reply is untrusted text. Cleanup is limited to removing code-fence
//! markup (and, failing that, cutting out the outermost `{...}`); after that
//! the value must be a JSON object carrying `overall` (or the legacy `score`)
//! and all five category scores. Out-of-range numbers are clamped into
//! `[1, 10]` rather than rejected. Optional sections that are malformed are
//! dropped, never fatal.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::domain::errors::{EcoError, EcoResult};
use crate::domain::models::assessment::clamp_score;
use crate::domain::models::{Assessment, CarbonFootprint, CategoryDetail, ScoreCategory, Scores};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\n?").expect("code fence pattern is valid"));

/// Validate a raw reply.
///
/// Fails with `MalformedResponse` when no JSON object can be recovered, and
/// with `SchemaViolation` when `overall` or any category score is missing or
/// not numeric.
pub fn validate(raw: &str) -> EcoResult<Assessment> {
    let value = parse_lenient(raw)?;
    let Value::Object(object) = value else {
        return Err(EcoError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_type(&value)
        )));
    };

    let overall = object
        .get("overall")
        .and_then(number)
        .or_else(|| object.get("score").and_then(number))
        .ok_or_else(|| EcoError::SchemaViolation("overall is missing or not a number".into()))?;

    let scores = scores(&object)?;

    Ok(Assessment {
        carbon_footprint: object.get("carbonFootprint").and_then(carbon_footprint),
        scores,
        overall: clamp_logged("overall", overall),
        quick_summary: object
            .get("quickSummary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        category_details: object.get("categoryDetails").and_then(category_details),
        recommendations: object
            .get("recommendations")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

/// Strip code fences and parse; fall back to the outermost braces.
fn parse_lenient(raw: &str) -> EcoResult<Value> {
    let cleaned = CODE_FENCE.replace_all(raw, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(EcoError::MalformedResponse("response was empty".into()));
    }

    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(err) => {
            let embedded = cleaned
                .find('{')
                .zip(cleaned.rfind('}'))
                .filter(|(start, end)| start < end)
                .and_then(|(start, end)| serde_json::from_str(&cleaned[start..=end]).ok());
            embedded.map_or_else(
                || Err(EcoError::MalformedResponse(err.to_string())),
                |value| {
                    debug!("recovered JSON object from surrounding prose");
                    Ok(value)
                },
            )
        }
    }
}

fn scores(object: &Map<String, Value>) -> EcoResult<Scores> {
    let Some(Value::Object(raw)) = object.get("scores") else {
        return Err(EcoError::SchemaViolation(
            "scores is missing or not an object".into(),
        ));
    };

    let mut scores = Scores::uniform(0.0);
    for category in ScoreCategory::ALL {
        let value = raw.get(category.key()).and_then(number).ok_or_else(|| {
            EcoError::SchemaViolation(format!(
                "scores.{} is missing or not a number",
                category.key()
            ))
        })?;
        scores.set(category, clamp_logged(category.key(), value));
    }
    Ok(scores)
}

fn carbon_footprint(value: &Value) -> Option<CarbonFootprint> {
    let object = value.as_object()?;
    let kg_co2e = object.get("kgCO2e").and_then(number).filter(|kg| *kg >= 0.0);
    let Some(kg_co2e) = kg_co2e else {
        warn!("dropping carbonFootprint without a usable kgCO2e figure");
        return None;
    };
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some(CarbonFootprint {
        kg_co2e,
        description: text("description"),
        comparison: text("comparison"),
    })
}

fn category_details(value: &Value) -> Option<BTreeMap<ScoreCategory, CategoryDetail>> {
    let object = value.as_object()?;
    let details: BTreeMap<_, _> = ScoreCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let detail = object.get(category.key())?;
            serde_json::from_value::<CategoryDetail>(detail.clone())
                .map_err(|err| debug!(category = category.key(), error = %err, "skipping category detail"))
                .ok()
                .map(|detail| (category, detail))
        })
        .collect();
    (!details.is_empty()).then_some(details)
}

/// Numbers, or strings holding one; never NaN or infinite.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn clamp_logged(field: &str, value: f64) -> f64 {
    let clamped = clamp_score(value);
    if (clamped - value).abs() > f64::EPSILON {
        warn!(field, value, clamped, "score out of range, clamped");
    }
    clamped
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
