use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::extraction::ExtractionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScanStage {
    Capturing,
    Extracting,
    Analyzing,
    Complete,
    Failed,
}

impl ScanStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStage::Complete | ScanStage::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub scan_id: Uuid,
    pub stage: ScanStage,
    /// 0 to 100.
    pub percent: u8,
    pub message: String,
}

impl ScanProgress {
    pub fn new(scan_id: Uuid, stage: ScanStage, percent: u8, message: impl Into<String>) -> Self {
        Self {
            scan_id,
            stage,
            percent,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("another scan is already running")]
    Busy,

    #[error("scan was abandoned before it finished")]
    Abandoned,
}

impl ScanError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ScanError::Extraction(e) => e.user_message(),
            ScanError::Busy => "A scan is already in progress. Please wait for it to finish.",
            ScanError::Abandoned => "The scan was cancelled.",
        }
    }
}
