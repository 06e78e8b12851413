use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, FixedOffset, Local, Utc};
use uuid::{NoContext, Timestamp, Uuid};

pub mod entities;

#[derive(Clone, Debug)]
pub struct LabelScanConfig {
    pub llm: LLMConfig,
    pub quota: QuotaConfig,
    pub ocr: OcrConfig,
    pub storage: StorageConfig,
    pub dataset: DatasetConfig,
}

#[derive(Clone, Debug)]
pub struct LLMConfig {
    /// Missing key means the AI path is disabled and every analysis runs offline.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub request_timeout: Duration,
    pub min_request_interval: Duration,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            request_timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuotaConfig {
    pub max_daily_requests: u32,
    pub burst_limit: usize,
    pub burst_window: Duration,
    /// How long request timestamps are kept once recorded.
    pub retention_window: Duration,
    /// Offset used to decide which calendar day a request belongs to.
    pub utc_offset: FixedOffset,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_daily_requests: 1500,
            burst_limit: 10,
            burst_window: Duration::from_secs(60),
            retention_window: Duration::from_secs(60 * 60),
            utc_offset: *Local::now().offset(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OcrConfig {
    pub tesseract_path: PathBuf,
    pub language: String,
    pub timeout: Duration,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct DatasetConfig {
    /// When unset the dataset compiled into the binary is used.
    pub path: Option<PathBuf>,
}

pub fn generate_timestamp() -> (DateTime<Utc>, Timestamp) {
    let now = Utc::now();
    let seconds = now.timestamp().try_into().unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, 0);

    (now, timestamp)
}

pub fn generate_uuid_v7() -> Uuid {
    let (_, timestamp) = generate_timestamp();
    Uuid::new_v7(timestamp)
}
