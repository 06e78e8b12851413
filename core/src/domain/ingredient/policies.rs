use std::sync::LazyLock;

use regex::Regex;

use crate::domain::ingredient::entities::RiskCategory;

/// Evaluated in order; the first match wins.
const HIGH_CONCERN_PATTERNS: &[&str] = &[
    r"trans\s*fat",
    r"partially\s*hydrogenated",
    r"hydrogenated.*oil",
    r"e102|tartrazine",
    r"e110|sunset yellow",
    r"e122|carmoisine",
    r"e124|ponceau",
    r"e129|allura red",
    r"e211|sodium benzoate",
    r"e223|sodium metabisulfite",
    r"e320|\bbha\b",
    r"e321|\bbht\b",
    r"aspartame",
    r"sodium nitrite",
    r"sodium nitrate",
];

const MODERATE_PATTERNS: &[&str] = &[
    r"palm\s*oil",
    r"\bmsg\b|monosodium glutamate",
    r"high fructose corn syrup",
    r"corn syrup",
    r"artificial\s*(colou?r|flavou?r|preservative)",
    r"e\d{3,4}",
    r"sodium",
    r"potassium sorbate",
    r"citric acid",
    r"natural flavou?ring",
];

static HIGH_CONCERN_REGEXES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile_patterns(HIGH_CONCERN_PATTERNS));

static MODERATE_REGEXES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile_patterns(MODERATE_PATTERNS));

fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(&format!("(?i){pattern}")).expect("Invalid risk pattern"))
        .collect()
}

/// Pattern-based category for a normalized name. High-concern patterns are
/// checked before moderate ones; `None` when nothing matches.
pub fn match_risk_pattern(normalized_name: &str) -> Option<RiskCategory> {
    if HIGH_CONCERN_REGEXES
        .iter()
        .any(|regex| regex.is_match(normalized_name))
    {
        return Some(RiskCategory::HighConcern);
    }

    if MODERATE_REGEXES
        .iter()
        .any(|regex| regex.is_match(normalized_name))
    {
        return Some(RiskCategory::Moderate);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_concern_patterns() {
        for name in [
            "trans fat",
            "partially hydrogenated soybean oil",
            "hydrogenated vegetable oil",
            "tartrazine",
            "colour e129",
            "sodium nitrite",
            "bha",
        ] {
            assert_eq!(
                match_risk_pattern(name),
                Some(RiskCategory::HighConcern),
                "{name}"
            );
        }
    }

    #[test]
    fn test_high_concern_wins_over_moderate() {
        // "sodium" alone is moderate, "sodium benzoate" is high concern
        assert_eq!(match_risk_pattern("sodium"), Some(RiskCategory::Moderate));
        assert_eq!(
            match_risk_pattern("sodium benzoate"),
            Some(RiskCategory::HighConcern)
        );
    }

    #[test]
    fn test_moderate_patterns() {
        for name in [
            "palm oil",
            "msg",
            "high fructose corn syrup",
            "artificial flavour",
            "e471",
            "potassium sorbate",
            "natural flavoring",
        ] {
            assert_eq!(
                match_risk_pattern(name),
                Some(RiskCategory::Moderate),
                "{name}"
            );
        }
    }

    #[test]
    fn test_abbreviations_need_word_boundaries() {
        assert_eq!(match_risk_pattern("bhaji spice"), None);
        assert_eq!(match_risk_pattern("msgr"), None);
    }

    #[test]
    fn test_unmatched_names() {
        assert_eq!(match_risk_pattern("water"), None);
        assert_eq!(match_risk_pattern("sugar"), None);
        assert_eq!(match_risk_pattern(""), None);
    }
}
