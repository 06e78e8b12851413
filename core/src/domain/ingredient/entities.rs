use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Coarse health-risk bucket assigned to a single ingredient.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum RiskCategory {
    #[default]
    Safe,
    Moderate,
    HighConcern,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Safe => "safe",
            RiskCategory::Moderate => "moderate",
            RiskCategory::HighConcern => "highConcern",
        }
    }

    pub fn is_concerning(&self) -> bool {
        !matches!(self, RiskCategory::Safe)
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRecord {
    /// Normalized lookup key.
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub category: RiskCategory,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
}

/// Explanation for an arbitrary ingredient name, stored or generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientInfo {
    pub name: String,
    pub category: RiskCategory,
    pub description: String,
    pub warning: Option<String>,
    pub alternatives: Vec<String>,
    /// False when the explanation was generated from pattern matching.
    pub known: bool,
}

/// Partition of scanned ingredient names. A name lives in at most one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskCategories {
    pub safe: Vec<String>,
    pub moderate: Vec<String>,
    pub high_concern: Vec<String>,
}

impl RiskCategories {
    /// Adds `name` to `category` unless an equal name (ignoring case) is already present.
    /// Returns whether the name was inserted.
    pub fn insert(&mut self, category: RiskCategory, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }

        match category {
            RiskCategory::Safe => self.safe.push(name),
            RiskCategory::Moderate => self.moderate.push(name),
            RiskCategory::HighConcern => self.high_concern.push(name),
        }
        true
    }

    pub fn get(&self, category: RiskCategory) -> &[String] {
        match category {
            RiskCategory::Safe => &self.safe,
            RiskCategory::Moderate => &self.moderate,
            RiskCategory::HighConcern => &self.high_concern,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        self.iter().any(|(existing, _)| existing.trim().to_lowercase() == needle)
    }

    pub fn len(&self) -> usize {
        self.safe.len() + self.moderate.len() + self.high_concern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every name with its bucket, most severe bucket first.
    pub fn iter(&self) -> impl Iterator<Item = (&String, RiskCategory)> {
        self.high_concern
            .iter()
            .map(|name| (name, RiskCategory::HighConcern))
            .chain(self.moderate.iter().map(|name| (name, RiskCategory::Moderate)))
            .chain(self.safe.iter().map(|name| (name, RiskCategory::Safe)))
    }

    /// High-concern names followed by moderate ones.
    pub fn concerning(&self) -> impl Iterator<Item = (&String, RiskCategory)> {
        self.iter().filter(|(_, category)| category.is_concerning())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub total: usize,
    pub safe: usize,
    pub moderate: usize,
    pub high_concern: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_names_unique_across_buckets() {
        let mut categories = RiskCategories::default();
        assert!(categories.insert(RiskCategory::HighConcern, "Trans Fat"));
        assert!(!categories.insert(RiskCategory::Safe, "trans fat"));
        assert!(categories.insert(RiskCategory::Safe, "Water"));

        assert_eq!(categories.high_concern, vec!["Trans Fat"]);
        assert_eq!(categories.safe, vec!["Water"]);
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn concerning_lists_high_concern_before_moderate() {
        let mut categories = RiskCategories::default();
        categories.insert(RiskCategory::Moderate, "Palm Oil");
        categories.insert(RiskCategory::Safe, "Water");
        categories.insert(RiskCategory::HighConcern, "E102");

        let names: Vec<_> = categories.concerning().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["E102", "Palm Oil"]);
    }

    #[test]
    fn category_serializes_in_camel_case() {
        let json = serde_json::to_string(&RiskCategory::HighConcern).unwrap();
        assert_eq!(json, "\"highConcern\"");
    }
}
