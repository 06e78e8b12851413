use std::collections::HashMap;

use crate::domain::ingredient::{
    entities::{DatabaseStats, IngredientInfo, IngredientRecord, RiskCategories, RiskCategory},
    policies::match_risk_pattern,
    value_objects::normalize_ingredient_name,
};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Static knowledge base of ingredient risks, keyed by normalized name.
///
/// Lookups never fail: unknown names fall back to pattern matching and then
/// to [`RiskCategory::Safe`].
#[derive(Debug, Clone, Default)]
pub struct IngredientDatabase {
    records: HashMap<String, IngredientRecord>,
}

impl IngredientDatabase {
    pub fn new(records: impl IntoIterator<Item = IngredientRecord>) -> Self {
        let records = records
            .into_iter()
            .filter_map(|mut record| {
                let key = normalize_ingredient_name(&record.key);
                if key.is_empty() {
                    return None;
                }
                record.key = key.clone();
                Some((key, record))
            })
            .collect();

        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn classify(&self, name: &str) -> RiskCategory {
        let normalized = normalize_ingredient_name(name);
        if normalized.is_empty() {
            return RiskCategory::Safe;
        }

        if let Some(record) = self.records.get(&normalized) {
            return record.category;
        }

        match_risk_pattern(&normalized).unwrap_or_default()
    }

    /// Stored record for an exact (normalized) match only.
    pub fn describe(&self, name: &str) -> Option<&IngredientRecord> {
        self.records.get(&normalize_ingredient_name(name))
    }

    /// Stored explanation when known, otherwise one generated from the
    /// pattern category.
    pub fn explain(&self, name: &str) -> IngredientInfo {
        if let Some(record) = self.describe(name) {
            return IngredientInfo {
                name: name.to_string(),
                category: record.category,
                description: record.description.clone(),
                warning: record.warning.clone(),
                alternatives: record.alternatives.clone(),
                known: true,
            };
        }

        let category = self.classify(name);
        let (description, warning) = match category {
            RiskCategory::HighConcern => (
                "This ingredient may pose significant health risks and should be consumed with caution.",
                Some("Consider avoiding products with this ingredient or consuming them rarely."),
            ),
            RiskCategory::Moderate => (
                "This ingredient may have some health concerns when consumed regularly.",
                Some("Consume in moderation as part of a balanced diet."),
            ),
            RiskCategory::Safe => (
                "This appears to be a generally safe ingredient based on common food safety guidelines.",
                None,
            ),
        };

        IngredientInfo {
            name: name.to_string(),
            category,
            description: description.to_string(),
            warning: warning.map(str::to_string),
            alternatives: Vec::new(),
            known: false,
        }
    }

    /// Classifies every non-blank name, keeping input order and dropping
    /// repeated names.
    pub fn categorize<I, S>(&self, names: I) -> RiskCategories
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories = RiskCategories::default();

        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            categories.insert(self.classify(name), name);
        }

        categories
    }

    /// Substring search over normalized keys, most severe first.
    pub fn search(&self, query: &str, limit: usize) -> Vec<IngredientRecord> {
        if query.trim().chars().count() < 2 {
            return Vec::new();
        }

        let needle = normalize_ingredient_name(query);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<&IngredientRecord> = self
            .records
            .values()
            .filter(|record| record.key.contains(&needle))
            .collect();

        matches.sort_by(|a, b| {
            b.category
                .cmp(&a.category)
                .then_with(|| a.key.cmp(&b.key))
        });

        matches.into_iter().take(limit).cloned().collect()
    }

    pub fn stats(&self) -> DatabaseStats {
        self.records
            .values()
            .fold(DatabaseStats::default(), |mut stats, record| {
                stats.total += 1;
                match record.category {
                    RiskCategory::Safe => stats.safe += 1,
                    RiskCategory::Moderate => stats.moderate += 1,
                    RiskCategory::HighConcern => stats.high_concern += 1,
                }
                stats
            })
    }
}
