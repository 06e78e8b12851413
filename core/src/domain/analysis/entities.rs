use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::ingredient::{RiskCategories, RiskCategory};

pub const MIN_HEALTH_SCORE: u8 = 1;
pub const MAX_HEALTH_SCORE: u8 = 10;

/// Which path produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Ai,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDetail {
    pub risk: RiskCategory,
    pub description: String,
}

/// Health assessment of one label. Built once per scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// 1 (avoid) to 10 (healthiest).
    pub health_score: u8,
    pub total_ingredients: usize,
    pub categories: RiskCategories,
    pub advice: String,
    pub warnings: Vec<String>,
    pub details: BTreeMap<String, IngredientDetail>,
    pub source: ReportSource,
}

/// Reasons the AI path was skipped. None of these reach the caller: each
/// one routes the analysis to the offline scorer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("daily or burst quota exhausted")]
    QuotaExceeded,

    #[error("malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("AI service is not configured: {0}")]
    Configuration(String),

    #[error("AI service request failed: {0}")]
    Network(String),
}
