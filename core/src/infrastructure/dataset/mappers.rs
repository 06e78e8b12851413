use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::ingredient::{IngredientRecord, RiskCategory};

const MISSING_DESCRIPTION: &str = "No additional information available";

/// On-disk layout of the ingredient dataset.
#[derive(Debug, Deserialize)]
pub struct DatasetFile {
    #[serde(default)]
    pub ingredients: BTreeMap<String, DatasetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetEntry {
    pub display_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub warning: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

fn category_from_str(category: Option<&str>) -> RiskCategory {
    match category.map(str::trim) {
        Some("highConcern") | Some("high_concern") | Some("high") => RiskCategory::HighConcern,
        Some("moderate") => RiskCategory::Moderate,
        _ => RiskCategory::Safe,
    }
}

impl DatasetFile {
    pub fn into_records(self) -> Vec<IngredientRecord> {
        self.ingredients
            .into_iter()
            .map(|(key, entry)| entry.into_record(key))
            .collect()
    }
}

impl DatasetEntry {
    pub fn into_record(self, key: String) -> IngredientRecord {
        IngredientRecord {
            key,
            display_name: self.display_name,
            category: category_from_str(self.category.as_deref()),
            description: self
                .description
                .filter(|description| !description.trim().is_empty())
                .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
            warning: self.warning.filter(|warning| !warning.trim().is_empty()),
            alternatives: self.alternatives,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_defaults() {
        let file: DatasetFile = serde_json::from_str(
            r#"{"ingredients": {"ghee": {}, "vanaspati": {"category": "highConcern", "warning": ""}}}"#,
        )
        .unwrap();

        let records = file.into_records();
        assert_eq!(records.len(), 2);

        let ghee = &records[0];
        assert_eq!(ghee.key, "ghee");
        assert_eq!(ghee.category, RiskCategory::Safe);
        assert_eq!(ghee.description, MISSING_DESCRIPTION);

        let vanaspati = &records[1];
        assert_eq!(vanaspati.category, RiskCategory::HighConcern);
        assert!(vanaspati.warning.is_none());
    }
}
