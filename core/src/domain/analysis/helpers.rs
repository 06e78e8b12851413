use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::domain::{
    analysis::entities::{IngredientDetail, MAX_HEALTH_SCORE, MIN_HEALTH_SCORE},
    ingredient::{IngredientDatabase, RiskCategories},
};

pub const MAX_SEGMENTED_INGREDIENTS: usize = 20;
pub const NEUTRAL_HEALTH_SCORE: u8 = 5;

pub const GENERIC_HIGH_CONCERN_WARNING: &str =
    "Contains ingredients that may pose health risks when consumed regularly";

/// Anchors tried in order; the first non-empty capture wins.
static ANCHOR_REGEXES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)ingredients[:\s]*(.*?)(?:\.|$|nutritional|contains|allergen)")
            .expect("Invalid ingredients anchor regex"),
        Regex::new(r"(?i)contains[:\s]*(.*?)(?:\.|$|nutritional|allergen)")
            .expect("Invalid contains anchor regex"),
    ]
});

static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;]").expect("Invalid separator regex"));

/// Splits label text into at most [`MAX_SEGMENTED_INGREDIENTS`] ingredient tokens.
pub fn segment_ingredients(text: &str) -> Vec<String> {
    let list = ANCHOR_REGEXES
        .iter()
        .find_map(|regex| {
            regex
                .captures(text)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str())
                .filter(|capture| !capture.is_empty())
        })
        .unwrap_or(text);

    SEPARATOR_REGEX
        .split(list)
        .map(str::trim)
        .filter(|token| token.chars().count() > 2)
        .take(MAX_SEGMENTED_INGREDIENTS)
        .map(str::to_string)
        .collect()
}

pub fn clamp_score(score: i64) -> u8 {
    score.clamp(i64::from(MIN_HEALTH_SCORE), i64::from(MAX_HEALTH_SCORE)) as u8
}

pub fn advice_for_score(score: u8) -> &'static str {
    match score {
        8.. => "This product appears to be a healthy choice with mostly natural ingredients.",
        6..=7 => "Consume in moderation. Some ingredients may pose health concerns.",
        _ => "Consider avoiding this product or finding healthier alternatives.",
    }
}

/// Explanations for every moderate and high-concern name.
pub fn concern_details(
    database: &IngredientDatabase,
    categories: &RiskCategories,
) -> BTreeMap<String, IngredientDetail> {
    categories
        .concerning()
        .map(|(name, category)| {
            let info = database.explain(name);
            (
                name.clone(),
                IngredientDetail {
                    risk: category,
                    description: info.description,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingredient::RiskCategory;

    #[test]
    fn test_segment_without_anchor_uses_whole_text() {
        assert_eq!(
            segment_ingredients("Water, Sugar, Trans Fat, Salt"),
            vec!["Water", "Sugar", "Trans Fat", "Salt"]
        );
    }

    #[test]
    fn test_segment_ingredients_anchor() {
        let text = "Chocolate biscuits. INGREDIENTS: Wheat Flour, Sugar; Palm Oil. Nutritional info: 500 kcal";
        assert_eq!(
            segment_ingredients(text),
            vec!["Wheat Flour", "Sugar", "Palm Oil"]
        );
    }

    #[test]
    fn test_segment_contains_anchor_and_stop_words() {
        let text = "CONTAINS: Milk Solids, Cocoa Butter allergen advice: nuts";
        assert_eq!(
            segment_ingredients(text),
            vec!["Milk Solids", "Cocoa Butter"]
        );
    }

    #[test]
    fn test_segment_drops_short_tokens_and_caps() {
        assert_eq!(segment_ingredients("ab, E1, Oats,  ,"), vec!["Oats"]);

        let long = (0..30).map(|i| format!("item{i}")).collect::<Vec<_>>().join(", ");
        let tokens = segment_ingredients(&long);
        assert_eq!(tokens.len(), MAX_SEGMENTED_INGREDIENTS);
        assert_eq!(tokens[19], "item19");
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-4), 1);
        assert_eq!(clamp_score(0), 1);
        assert_eq!(clamp_score(7), 7);
        assert_eq!(clamp_score(42), 10);
    }

    #[test]
    fn test_advice_bands() {
        assert!(advice_for_score(10).starts_with("This product appears"));
        assert!(advice_for_score(8).starts_with("This product appears"));
        assert!(advice_for_score(6).starts_with("Consume in moderation"));
        assert!(advice_for_score(5).starts_with("Consider avoiding"));
    }

    #[test]
    fn test_concern_details_skip_safe_names() {
        let database = IngredientDatabase::empty();
        let categories = database.categorize(["Water", "MSG", "Trans Fat"]);

        let details = concern_details(&database, &categories);
        assert_eq!(details.len(), 2);
        assert_eq!(details["Trans Fat"].risk, RiskCategory::HighConcern);
        assert_eq!(details["MSG"].risk, RiskCategory::Moderate);
        assert!(!details.contains_key("Water"));
    }
}
