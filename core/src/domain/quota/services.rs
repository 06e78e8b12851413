use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::{
    common::QuotaConfig,
    quota::{
        entities::{DelayAdvice, QuotaState, UsageStats},
        ports::{Clock, KeyValueStore},
    },
};

pub const USAGE_STORAGE_KEY: &str = "labelscan_api_usage";

const MIN_RECOMMENDED_DELAY: Duration = Duration::from_secs(2);
const MAX_RECOMMENDED_DELAY: Duration = Duration::from_secs(5 * 60);

/// Admission control for outbound AI calls: a daily ceiling plus a
/// short-window burst ceiling, persisted per calendar day.
///
/// Every read-modify-write runs under one lock, so a check followed by
/// [`QuotaTracker::record`] from the same caller cannot interleave with
/// another caller's write.
///
/// Methods call the store synchronously. Async callers on the hot path go
/// through `spawn_blocking` (see `AiAnalysisClient`).
pub struct QuotaTracker<S, C> {
    store: S,
    clock: C,
    config: QuotaConfig,
    lock: Mutex<()>,
}

impl<S, C> QuotaTracker<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    pub fn new(store: S, clock: C, config: QuotaConfig) -> Self {
        Self {
            store,
            clock,
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    pub fn can_proceed(&self) -> bool {
        let _guard = self.guard();
        let now = self.clock.now();
        let state = self.load(now);
        self.admits(&state, now)
    }

    /// Counts one dispatched request. Call exactly once per request that
    /// actually reached the AI service.
    pub fn record(&self) {
        let _guard = self.guard();
        let now = self.clock.now();
        let now_ms = now.timestamp_millis();

        let mut state = self.load(now);
        state.requests = state.requests.saturating_add(1);
        state.timestamps.push(now_ms);
        self.prune(&mut state, now_ms);
        self.save(&state);

        debug!(
            requests = state.requests,
            limit = self.config.max_daily_requests,
            "API request recorded"
        );
    }

    pub fn remaining(&self) -> u32 {
        let _guard = self.guard();
        let state = self.load(self.clock.now());
        self.remaining_for(&state)
    }

    pub fn request_count(&self) -> u32 {
        let _guard = self.guard();
        self.load(self.clock.now()).requests
    }

    pub fn usage_percentage(&self) -> u32 {
        let _guard = self.guard();
        let state = self.load(self.clock.now());
        self.percentage_for(&state)
    }

    pub fn time_until_reset(&self) -> Duration {
        self.until_reset(self.clock.now())
    }

    pub fn is_approaching_limit(&self, threshold: f64) -> bool {
        f64::from(self.usage_percentage()) >= threshold * 100.0
    }

    pub fn stats(&self) -> UsageStats {
        let _guard = self.guard();
        let now = self.clock.now();
        let state = self.load(now);

        UsageStats {
            count: state.requests,
            limit: self.config.max_daily_requests,
            remaining: self.remaining_for(&state),
            percentage: self.percentage_for(&state),
            reset_eta_secs: self.until_reset(now).as_secs(),
            can_proceed: self.admits(&state, now),
            last_request_at: state
                .timestamps
                .last()
                .and_then(|ms| Utc.timestamp_millis_opt(*ms).single()),
        }
    }

    /// Spreads the remaining budget evenly over the time left until reset.
    pub fn recommended_delay(&self) -> DelayAdvice {
        let remaining = self.remaining();
        if remaining == 0 {
            return DelayAdvice::Blocked;
        }

        let spread = self.time_until_reset() / remaining;
        DelayAdvice::Wait(spread.clamp(MIN_RECOMMENDED_DELAY, MAX_RECOMMENDED_DELAY))
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn day_key(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.config.utc_offset)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string()
    }

    fn until_reset(&self, now: DateTime<Utc>) -> Duration {
        let local = now.with_timezone(&self.config.utc_offset);
        local
            .date_naive()
            .succ_opt()
            .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
            .and_then(|midnight| {
                midnight
                    .and_local_timezone(self.config.utc_offset)
                    .single()
            })
            .and_then(|midnight| (midnight - local).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    fn load(&self, now: DateTime<Utc>) -> QuotaState {
        let today = self.day_key(now);
        let now_ms = now.timestamp_millis();

        let mut state = match self.store.get(USAGE_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<QuotaState>(&raw) {
                Ok(state) if state.date == today => state,
                Ok(state) => {
                    info!(previous = %state.date, today = %today, "New day detected, resetting API usage");
                    QuotaState::fresh(today, now_ms)
                }
                Err(e) => {
                    warn!(error = %e, "Stored API usage is unreadable, starting fresh");
                    QuotaState::fresh(today, now_ms)
                }
            },
            Ok(None) => QuotaState::fresh(today, now_ms),
            Err(e) => {
                warn!(error = %e, "Failed to read API usage, starting fresh");
                QuotaState::fresh(today, now_ms)
            }
        };

        self.prune(&mut state, now_ms);
        state
    }

    fn save(&self, state: &QuotaState) {
        let result = serde_json::to_string(state)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                self.store
                    .set(USAGE_STORAGE_KEY, &raw)
                    .map_err(|e| e.to_string())
            });

        if let Err(e) = result {
            error!(error = %e, "Failed to save API usage");
        }
    }

    fn prune(&self, state: &mut QuotaState, now_ms: i64) {
        let retention_ms = duration_millis(self.config.retention_window);
        let cutoff = now_ms.saturating_sub(retention_ms);
        state.timestamps.retain(|&ts| ts > cutoff);
    }

    fn admits(&self, state: &QuotaState, now: DateTime<Utc>) -> bool {
        if state.requests >= self.config.max_daily_requests {
            warn!(
                requests = state.requests,
                limit = self.config.max_daily_requests,
                "Daily API limit reached"
            );
            return false;
        }

        let window_start = now
            .timestamp_millis()
            .saturating_sub(duration_millis(self.config.burst_window));
        let recent = state
            .timestamps
            .iter()
            .filter(|&&ts| ts > window_start)
            .count();

        if recent >= self.config.burst_limit {
            warn!(
                recent,
                burst_limit = self.config.burst_limit,
                "Burst limit reached"
            );
            return false;
        }

        true
    }

    fn remaining_for(&self, state: &QuotaState) -> u32 {
        self.config.max_daily_requests.saturating_sub(state.requests)
    }

    fn percentage_for(&self, state: &QuotaState) -> u32 {
        if self.config.max_daily_requests == 0 {
            return 100;
        }
        (f64::from(state.requests) / f64::from(self.config.max_daily_requests) * 100.0).round()
            as u32
    }
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
