use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{
    analysis::{
        entities::{AnalysisError, AnalysisReport, IngredientDetail, ReportSource},
        helpers::{
            NEUTRAL_HEALTH_SCORE, advice_for_score, clamp_score, concern_details,
            segment_ingredients,
        },
    },
    ingredient::{IngredientDatabase, RiskCategories, RiskCategory},
};

pub const DEFAULT_ADVICE: &str = "No specific advice available";
pub const DEFAULT_DETAIL_DESCRIPTION: &str = "No additional information available";

static SCORE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:health\s*score|score)[:\s]*(\d+(?:\.\d+)?)").expect("Invalid score regex")
});

static ADVICE_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)advice[:\s]*([^.!?]*[.!?])",
        r"(?i)recommend[:\s]*([^.!?]*[.!?])",
        r"(?i)consumption[:\s]*([^.!?]*[.!?])",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid advice regex"))
    .collect()
});

static WARNING_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)warning[:\s]*([^.!?]*[.!?])",
        r"(?i)caution[:\s]*([^.!?]*[.!?])",
        r"(?i)avoid[:\s]*([^.!?]*[.!?])",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid warning regex"))
    .collect()
});

/// Turns an AI reply into a report. Never fails: a reply without a usable
/// JSON object goes through [`parse_heuristic`].
pub fn parse_response(
    response: &str,
    original_text: &str,
    database: &IngredientDatabase,
) -> AnalysisReport {
    let structured = extract_json_payload(response)
        .ok_or_else(|| AnalysisError::MalformedResponse("no JSON object in reply".to_string()))
        .and_then(parse_structured);

    match structured {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "Falling back to heuristic parsing of AI reply");
            parse_heuristic(response, original_text, database)
        }
    }
}

/// Text from the first `{` to the last `}`.
pub fn extract_json_payload(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

/// Strictly parses a JSON payload, then validates and clamps every field.
pub fn parse_structured(payload: &str) -> Result<AnalysisReport, AnalysisError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

    let object = value.as_object().ok_or_else(|| {
        AnalysisError::MalformedResponse("reply is not a JSON object".to_string())
    })?;

    Ok(validate_report(object))
}

fn validate_report(object: &Map<String, Value>) -> AnalysisReport {
    let health_score = object
        .get("healthScore")
        .and_then(numeric_value)
        .map(clamp_score)
        .unwrap_or(NEUTRAL_HEALTH_SCORE);

    let categories = object
        .get("categories")
        .and_then(Value::as_object)
        .map(validate_categories)
        .unwrap_or_default();

    let total_ingredients = object
        .get("totalIngredients")
        .and_then(numeric_value)
        .filter(|total| *total > 0)
        .and_then(|total| usize::try_from(total).ok())
        .unwrap_or_else(|| categories.len());

    let advice = object
        .get("advice")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|advice| !advice.is_empty())
        .unwrap_or(DEFAULT_ADVICE)
        .to_string();

    let warnings = object.get("warnings").map(string_list).unwrap_or_default();

    let details = object.get("details").map(validate_details).unwrap_or_default();

    AnalysisReport {
        health_score,
        total_ingredients,
        categories,
        advice,
        warnings,
        details,
        source: ReportSource::Ai,
    }
}

/// Integers, floats (truncated) and numeric strings.
fn numeric_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.trunc() as i64)),
        // "NaN" and "inf" parse as f64 but carry no score
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Most severe bucket is filled first so a repeated name keeps its worst rating.
fn validate_categories(object: &Map<String, Value>) -> RiskCategories {
    let mut categories = RiskCategories::default();

    for (key, category) in [
        ("highConcern", RiskCategory::HighConcern),
        ("moderate", RiskCategory::Moderate),
        ("safe", RiskCategory::Safe),
    ] {
        for name in object.get(key).map(string_list).unwrap_or_default() {
            if !categories.insert(category, name.clone()) {
                debug!(%name, "Dropping ingredient listed in more than one category");
            }
        }
    }

    categories
}

/// Accepts the keyed-object form and the array-of-entries form.
fn validate_details(value: &Value) -> BTreeMap<String, IngredientDetail> {
    match value {
        Value::Object(entries) => entries
            .iter()
            .filter_map(|(name, detail)| {
                let detail = detail.as_object()?;
                Some((name.trim().to_string(), validate_detail(detail)))
            })
            .filter(|(name, _)| !name.is_empty())
            .collect(),
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| {
                let detail = entry.as_object()?;
                let name = detail
                    .get("ingredient")
                    .or_else(|| detail.get("name"))
                    .and_then(Value::as_str)?
                    .trim();
                (!name.is_empty()).then(|| (name.to_string(), validate_detail(detail)))
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn validate_detail(detail: &Map<String, Value>) -> IngredientDetail {
    let risk = detail
        .get("risk")
        .and_then(Value::as_str)
        .map(detail_risk)
        .unwrap_or(RiskCategory::Moderate);

    let description = detail
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .unwrap_or(DEFAULT_DETAIL_DESCRIPTION)
        .to_string();

    IngredientDetail { risk, description }
}

fn detail_risk(risk: &str) -> RiskCategory {
    match risk.trim().to_lowercase().as_str() {
        "high" | "highconcern" | "high_concern" => RiskCategory::HighConcern,
        "low" | "safe" => RiskCategory::Safe,
        _ => RiskCategory::Moderate,
    }
}

/// Best-effort reading of a free-text reply. Ingredients come from the
/// original label text, classified through the database.
pub fn parse_heuristic(
    response: &str,
    original_text: &str,
    database: &IngredientDatabase,
) -> AnalysisReport {
    let health_score = SCORE_REGEX
        .captures(response)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|score| score.is_finite())
        .map(|score| clamp_score(score.round() as i64))
        .unwrap_or(NEUTRAL_HEALTH_SCORE);

    let ingredients = segment_ingredients(original_text);
    let categories = database.categorize(&ingredients);

    let advice = ADVICE_REGEXES
        .iter()
        .find_map(|regex| {
            regex
                .captures(response)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
        .filter(|advice| !advice.is_empty())
        .unwrap_or_else(|| advice_for_score(health_score).to_string());

    let warnings = WARNING_REGEXES
        .iter()
        .flat_map(|regex| regex.captures_iter(response))
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|warning| !warning.is_empty())
        .collect();

    let details = concern_details(database, &categories);

    AnalysisReport {
        health_score,
        total_ingredients: ingredients.len(),
        categories,
        advice,
        warnings,
        details,
        source: ReportSource::Ai,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_payload_spans_outer_braces() {
        let reply = "```json\n{\"a\": {\"b\": 1}}\n```";
        assert_eq!(extract_json_payload(reply), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_payload("no json"), None);
        assert_eq!(extract_json_payload("} backwards {"), None);
    }

    #[test]
    fn test_parse_structured_full_reply() {
        let payload = r#"{
            "healthScore": 4,
            "totalIngredients": 3,
            "categories": {
                "safe": ["Water"],
                "moderate": ["Palm Oil"],
                "highConcern": ["Trans Fat"]
            },
            "advice": "Eat rarely.",
            "warnings": ["Trans fats raise LDL."],
            "details": {
                "Trans Fat": { "risk": "high", "description": "Bad for the heart." },
                "Palm Oil": { "risk": "medium" }
            }
        }"#;

        let report = parse_structured(payload).unwrap();
        assert_eq!(report.health_score, 4);
        assert_eq!(report.total_ingredients, 3);
        assert_eq!(report.categories.high_concern, vec!["Trans Fat"]);
        assert_eq!(report.advice, "Eat rarely.");
        assert_eq!(report.warnings, vec!["Trans fats raise LDL."]);
        assert_eq!(report.details["Trans Fat"].risk, RiskCategory::HighConcern);
        assert_eq!(report.details["Palm Oil"].risk, RiskCategory::Moderate);
        assert_eq!(
            report.details["Palm Oil"].description,
            DEFAULT_DETAIL_DESCRIPTION
        );
        assert_eq!(report.source, ReportSource::Ai);
    }

    #[test]
    fn test_parse_structured_clamps_and_defaults() {
        let report = parse_structured(r#"{"healthScore": 42}"#).unwrap();
        assert_eq!(report.health_score, 10);
        assert_eq!(report.advice, DEFAULT_ADVICE);
        assert!(report.categories.is_empty());
        assert_eq!(report.total_ingredients, 0);

        let report = parse_structured(r#"{"healthScore": "6.9"}"#).unwrap();
        assert_eq!(report.health_score, 6);

        let report = parse_structured(r#"{"healthScore": 2.7}"#).unwrap();
        assert_eq!(report.health_score, 2);

        let report = parse_structured(r#"{"healthScore": "great"}"#).unwrap();
        assert_eq!(report.health_score, NEUTRAL_HEALTH_SCORE);

        let report = parse_structured(r#"{"healthScore": -3}"#).unwrap();
        assert_eq!(report.health_score, 1);
    }

    #[test]
    fn test_parse_structured_non_finite_score_is_neutral() {
        for score in ["NaN", "inf", "-inf", "infinity"] {
            let payload = format!(r#"{{"healthScore": "{score}"}}"#);
            let report = parse_structured(&payload).unwrap();
            assert_eq!(report.health_score, NEUTRAL_HEALTH_SCORE, "{score}");
        }
    }

    #[test]
    fn test_parse_structured_cleans_lists() {
        let payload = r#"{
            "categories": {
                "safe": ["Water", 7, null, "MSG"],
                "moderate": "Palm Oil",
                "highConcern": ["msg"]
            },
            "totalIngredients": 0,
            "warnings": [1, "Contains MSG."],
            "details": [
                { "ingredient": "MSG", "risk": "HIGH", "description": "Flavour enhancer." },
                { "risk": "low" },
                "junk"
            ]
        }"#;

        let report = parse_structured(payload).unwrap();
        assert_eq!(report.categories.high_concern, vec!["msg"]);
        assert_eq!(report.categories.safe, vec!["Water"]);
        assert!(report.categories.moderate.is_empty());
        assert_eq!(report.total_ingredients, 2);
        assert_eq!(report.warnings, vec!["Contains MSG."]);
        assert_eq!(report.details.len(), 1);
        assert_eq!(report.details["MSG"].risk, RiskCategory::HighConcern);
    }

    #[test]
    fn test_parse_structured_rejects_invalid_json() {
        assert!(matches!(
            parse_structured("{healthScore: 5"),
            Err(AnalysisError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_structured("[1, 2]"),
            Err(AnalysisError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_heuristic_reads_free_text() {
        let reply = "Health Score: 6.6 out of 10. Advice: eat this occasionally. \
                     Warning: contains trans fat. Caution: high in sodium!";
        let database = IngredientDatabase::empty();

        let report = parse_heuristic(reply, "Ingredients: Water, Trans Fat, Salt", &database);
        assert_eq!(report.health_score, 7);
        assert_eq!(report.advice, "eat this occasionally.");
        assert_eq!(
            report.warnings,
            vec!["contains trans fat.", "high in sodium!"]
        );
        assert_eq!(report.total_ingredients, 3);
        assert_eq!(report.categories.high_concern, vec!["Trans Fat"]);
        assert!(report.details.contains_key("Trans Fat"));
        assert_eq!(report.source, ReportSource::Ai);
    }

    #[test]
    fn test_parse_heuristic_defaults() {
        let database = IngredientDatabase::empty();
        let report = parse_heuristic("I cannot help with that", "Water, Sugar", &database);
        assert_eq!(report.health_score, NEUTRAL_HEALTH_SCORE);
        assert_eq!(report.advice, advice_for_score(NEUTRAL_HEALTH_SCORE));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_parse_response_falls_back_on_broken_payload() {
        let database = IngredientDatabase::empty();
        let report = parse_response(
            "Here you go: { healthScore: 9, oops",
            "Water, Sugar, Trans Fat",
            &database,
        );
        assert!((1..=10).contains(&report.health_score));
        assert_eq!(report.health_score, 9);
        assert_eq!(report.categories.high_concern, vec!["Trans Fat"]);
    }
}
