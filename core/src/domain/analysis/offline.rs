use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    analysis::{
        entities::{AnalysisReport, ReportSource},
        helpers::{
            GENERIC_HIGH_CONCERN_WARNING, advice_for_score, clamp_score, concern_details,
            segment_ingredients,
        },
    },
    ingredient::{IngredientDatabase, RiskCategories},
};

const HIGH_CONCERN_PENALTY: i64 = 2;
const MODERATE_PENALTY: i64 = 1;

/// Rule-based scoring against the ingredient database. Deterministic and
/// total: every input produces a complete report.
#[derive(Debug, Clone)]
pub struct OfflineRiskScorer {
    database: Arc<IngredientDatabase>,
}

impl OfflineRiskScorer {
    pub fn new(database: Arc<IngredientDatabase>) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &IngredientDatabase {
        &self.database
    }

    pub fn score(&self, text: &str) -> AnalysisReport {
        let ingredients = segment_ingredients(text);
        let categories = self.database.categorize(&ingredients);

        let penalty = HIGH_CONCERN_PENALTY * categories.high_concern.len() as i64
            + MODERATE_PENALTY * categories.moderate.len() as i64;
        let health_score = clamp_score(10 - penalty);

        debug!(
            ingredients = ingredients.len(),
            high_concern = categories.high_concern.len(),
            moderate = categories.moderate.len(),
            health_score,
            "Offline analysis complete"
        );

        AnalysisReport {
            health_score,
            total_ingredients: ingredients.len(),
            advice: advice_for_score(health_score).to_string(),
            warnings: self.warnings_for(&categories),
            details: concern_details(&self.database, &categories),
            categories,
            source: ReportSource::Offline,
        }
    }

    /// Stored warnings for high-concern names, or one generic warning when
    /// none of them has specific text.
    fn warnings_for(&self, categories: &RiskCategories) -> Vec<String> {
        let mut warnings: Vec<String> = categories
            .high_concern
            .iter()
            .filter_map(|name| self.database.describe(name))
            .filter_map(|record| record.warning.clone())
            .collect();

        if warnings.is_empty() && !categories.high_concern.is_empty() {
            warnings.push(GENERIC_HIGH_CONCERN_WARNING.to_string());
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingredient::{IngredientRecord, RiskCategory};

    fn record(key: &str, category: RiskCategory, warning: Option<&str>) -> IngredientRecord {
        IngredientRecord {
            key: key.to_string(),
            display_name: None,
            category,
            description: format!("About {key}."),
            warning: warning.map(str::to_string),
            alternatives: vec![],
        }
    }

    fn scorer() -> OfflineRiskScorer {
        OfflineRiskScorer::new(Arc::new(IngredientDatabase::new(vec![
            record("water", RiskCategory::Safe, None),
            record("sugar", RiskCategory::Safe, None),
            record("salt", RiskCategory::Safe, None),
            record(
                "partially hydrogenated oil",
                RiskCategory::HighConcern,
                Some("Source of artificial trans fats."),
            ),
        ])))
    }

    #[test]
    fn test_trans_fat_label() {
        let report = scorer().score("Water, Sugar, Trans Fat, Salt");

        assert_eq!(report.categories.high_concern, vec!["Trans Fat"]);
        assert_eq!(report.categories.safe, vec!["Water", "Sugar", "Salt"]);
        assert!(report.categories.moderate.is_empty());
        assert_eq!(report.health_score, 8);
        assert_eq!(report.total_ingredients, 4);
        assert_eq!(report.warnings, vec![GENERIC_HIGH_CONCERN_WARNING]);
        assert_eq!(report.details.len(), 1);
        assert_eq!(report.source, ReportSource::Offline);
    }

    #[test]
    fn test_anchored_label_uses_stored_warning() {
        let report = scorer().score("INGREDIENTS: Water, Partially Hydrogenated Oil, Salt");

        assert_eq!(
            report.categories.high_concern,
            vec!["Partially Hydrogenated Oil"]
        );
        assert_eq!(report.health_score, 8);
        assert_eq!(report.warnings, vec!["Source of artificial trans fats."]);
        assert_eq!(
            report.details["Partially Hydrogenated Oil"].description,
            "About partially hydrogenated oil."
        );
    }

    #[test]
    fn test_score_never_drops_below_one() {
        let report = scorer().score("Trans Fat, Aspartame, Tartrazine, Sodium Nitrite, E211 Sodium Benzoate, MSG");
        assert_eq!(report.health_score, 1);
        assert!(report.advice.starts_with("Consider avoiding"));
    }

    #[test]
    fn test_moderate_only_label() {
        let report = scorer().score("Ingredients: Oats, Palm Oil, Citric Acid");
        assert_eq!(report.health_score, 8);
        assert!(report.warnings.is_empty());
        assert_eq!(report.details.len(), 2);
    }

    #[test]
    fn test_empty_text_still_yields_report() {
        let report = scorer().score("");
        assert_eq!(report.health_score, 10);
        assert_eq!(report.total_ingredients, 0);
        assert!(report.categories.is_empty());
    }
}
