use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Persisted usage counters for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaState {
    /// Calendar day key, `YYYY-MM-DD`.
    pub date: String,
    pub requests: u32,
    /// Unix milliseconds of recorded requests, oldest first.
    pub timestamps: Vec<i64>,
    pub last_reset: i64,
}

impl QuotaState {
    pub fn fresh(date: String, now_ms: i64) -> Self {
        Self {
            date,
            requests: 0,
            timestamps: Vec::new(),
            last_reset: now_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub count: u32,
    pub limit: u32,
    pub remaining: u32,
    pub percentage: u32,
    pub reset_eta_secs: u64,
    pub can_proceed: bool,
    pub last_request_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayAdvice {
    /// No budget left until the next reset.
    Blocked,
    Wait(Duration),
}
