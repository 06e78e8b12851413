use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, OnceCell},
    time::Instant,
};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{
    analysis::{
        entities::{AnalysisError, AnalysisReport},
        offline::OfflineRiskScorer,
        parsing::parse_response,
        ports::LLMClient,
        prompts::ingredient_analysis_prompt,
        schema::get_analysis_report_schema,
    },
    common::LLMConfig,
    quota::{
        entities::UsageStats,
        ports::{Clock, KeyValueStore},
        services::QuotaTracker,
    },
};

/// Best-effort AI analysis with an offline fallback.
///
/// [`AiAnalysisClient::analyze`] always returns a report. Quota denial,
/// missing credentials, transport errors and unusable replies all route to
/// the [`OfflineRiskScorer`]; the report's `source` tells the paths apart.
pub struct AiAnalysisClient<L, S, C>
where
    L: LLMClient,
    S: KeyValueStore,
    C: Clock,
{
    llm: L,
    quota: Arc<QuotaTracker<S, C>>,
    scorer: OfflineRiskScorer,
    min_request_interval: Duration,
    connected: OnceCell<()>,
    /// Single dispatch slot. Holds the instant of the last request sent.
    last_dispatch: Mutex<Option<Instant>>,
}

impl<L, S, C> AiAnalysisClient<L, S, C>
where
    L: LLMClient,
    S: KeyValueStore + 'static,
    C: Clock + 'static,
{
    pub fn new(
        llm: L,
        quota: Arc<QuotaTracker<S, C>>,
        scorer: OfflineRiskScorer,
        config: &LLMConfig,
    ) -> Self {
        Self {
            llm,
            quota,
            scorer,
            min_request_interval: config.min_request_interval,
            connected: OnceCell::new(),
            last_dispatch: Mutex::new(None),
        }
    }

    #[instrument(skip(self, text), fields(text_length = text.len()))]
    pub async fn analyze(&self, text: &str) -> AnalysisReport {
        match self.analyze_with_ai(text).await {
            Ok(report) => {
                info!(health_score = report.health_score, "AI analysis complete");
                report
            }
            Err(e) => {
                match &e {
                    AnalysisError::Configuration(_) => {
                        info!(reason = %e, "AI analysis unavailable, using offline analysis")
                    }
                    _ => warn!(reason = %e, "AI analysis failed, using offline analysis"),
                }
                self.scorer.score(text)
            }
        }
    }

    pub async fn usage(&self) -> UsageStats {
        match self.with_quota(|quota| quota.stats()).await {
            Some(stats) => stats,
            None => self.quota.stats(),
        }
    }

    pub fn quota(&self) -> &Arc<QuotaTracker<S, C>> {
        &self.quota
    }

    pub fn scorer(&self) -> &OfflineRiskScorer {
        &self.scorer
    }

    async fn analyze_with_ai(&self, text: &str) -> Result<AnalysisReport, AnalysisError> {
        // held until the request is recorded so admission and record cannot interleave
        let mut last_dispatch = self.last_dispatch.lock().await;

        let admitted = self
            .with_quota(|quota| quota.can_proceed())
            .await
            .unwrap_or(false);
        if !admitted {
            return Err(AnalysisError::QuotaExceeded);
        }

        self.connected
            .get_or_try_init(|| self.llm.connect())
            .await?;

        if let Some(previous) = *last_dispatch {
            let ready_at = previous + self.min_request_interval;
            if ready_at > Instant::now() {
                debug!(
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "Spacing out AI requests"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_dispatch = Some(Instant::now());
        let response = self
            .llm
            .generate_with_text(ingredient_analysis_prompt(text), get_analysis_report_schema())
            .await?;

        self.with_quota(|quota| quota.record()).await;
        drop(last_dispatch);

        Ok(parse_response(&response, text, self.scorer.database()))
    }

    /// Runs a quota operation on the blocking pool, since the store behind
    /// it may do synchronous file I/O. `None` if the operation panicked.
    async fn with_quota<T, F>(&self, operation: F) -> Option<T>
    where
        F: FnOnce(&QuotaTracker<S, C>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let quota = self.quota.clone();
        tokio::task::spawn_blocking(move || operation(&quota))
            .await
            .map_err(|e| error!(error = %e, "Quota operation failed"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex as StdMutex,
        atomic::{AtomicUsize, Ordering},
    };

    use chrono::FixedOffset;

    use super::*;
    use crate::{
        domain::{
            analysis::entities::ReportSource,
            common::{QuotaConfig, entities::app_errors::StoreError},
            ingredient::IngredientDatabase,
        },
        infrastructure::{clock::SystemClock, storage::InMemoryKeyValueStore},
    };

    struct FakeLLM {
        connect_result: Result<(), AnalysisError>,
        reply: Result<String, AnalysisError>,
        connect_calls: AtomicUsize,
        sent_at: StdMutex<Vec<Instant>>,
    }

    impl FakeLLM {
        fn replying(reply: Result<String, AnalysisError>) -> Self {
            Self {
                connect_result: Ok(()),
                reply,
                connect_calls: AtomicUsize::new(0),
                sent_at: StdMutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<Instant> {
            self.sent_at.lock().unwrap().clone()
        }
    }

    impl LLMClient for FakeLLM {
        async fn connect(&self) -> Result<(), AnalysisError> {
            self.connect_calls.fetch_add(1, Ordering::SeqCst);
            self.connect_result.clone()
        }

        async fn generate_with_text(
            &self,
            prompt: String,
            _response_schema: serde_json::Value,
        ) -> Result<String, AnalysisError> {
            assert!(prompt.contains("INGREDIENT LIST:"));
            self.sent_at.lock().unwrap().push(Instant::now());
            self.reply.clone()
        }
    }

    type Client = AiAnalysisClient<FakeLLM, InMemoryKeyValueStore, SystemClock>;

    fn client(llm: FakeLLM, max_daily_requests: u32) -> Client {
        let quota = QuotaTracker::new(
            InMemoryKeyValueStore::new(),
            SystemClock,
            QuotaConfig {
                max_daily_requests,
                utc_offset: FixedOffset::east_opt(0).unwrap(),
                ..QuotaConfig::default()
            },
        );

        AiAnalysisClient::new(
            llm,
            Arc::new(quota),
            OfflineRiskScorer::new(Arc::new(IngredientDatabase::empty())),
            &LLMConfig::default(),
        )
    }

    const LABEL: &str = "INGREDIENTS: Water, Partially Hydrogenated Oil, Salt";

    const STRUCTURED_REPLY: &str = r#"Sure! {"healthScore": 3, "totalIngredients": 3,
        "categories": {"safe": ["Water", "Salt"], "moderate": [], "highConcern": ["Partially Hydrogenated Oil"]},
        "advice": "Avoid.", "warnings": ["Trans fats."], "details": {}}"#;

    #[tokio::test(start_paused = true)]
    async fn test_structured_reply_is_used_and_recorded() {
        let client = client(FakeLLM::replying(Ok(STRUCTURED_REPLY.to_string())), 100);

        let report = client.analyze(LABEL).await;
        assert_eq!(report.source, ReportSource::Ai);
        assert_eq!(report.health_score, 3);
        assert_eq!(report.advice, "Avoid.");
        assert_eq!(client.usage().await.count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unstructured_reply_goes_through_heuristics() {
        let client = client(
            FakeLLM::replying(Ok("Score: 4. Warning: trans fats present.".to_string())),
            100,
        );

        let report = client.analyze(LABEL).await;
        assert_eq!(report.source, ReportSource::Ai);
        assert_eq!(report.health_score, 4);
        assert_eq!(report.warnings, vec!["trans fats present."]);
        assert_eq!(
            report.categories.high_concern,
            vec!["Partially Hydrogenated Oil"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_credentials_route_offline() {
        let mut llm = FakeLLM::replying(Ok(STRUCTURED_REPLY.to_string()));
        llm.connect_result = Err(AnalysisError::Configuration("no API key".to_string()));
        let client = client(llm, 100);

        let report = client.analyze(LABEL).await;
        assert_eq!(report.source, ReportSource::Offline);
        assert_eq!(report.health_score, 8);
        assert_eq!(
            report.categories.high_concern,
            vec!["Partially Hydrogenated Oil"]
        );
        assert!(client.llm.sent().is_empty());
        assert_eq!(client.usage().await.count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_is_not_recorded() {
        let client = client(
            FakeLLM::replying(Err(AnalysisError::Network("connection reset".to_string()))),
            100,
        );

        let report = client.analyze(LABEL).await;
        assert_eq!(report.source, ReportSource::Offline);
        assert_eq!(client.llm.sent().len(), 1);
        assert_eq!(client.usage().await.count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_quota_skips_dispatch() {
        let client = client(FakeLLM::replying(Ok(STRUCTURED_REPLY.to_string())), 0);

        let report = client.analyze(LABEL).await;
        assert_eq!(report.source, ReportSource::Offline);
        assert!(client.llm.sent().is_empty());
        assert_eq!(client.llm.connect_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_is_established_once() {
        let client = client(FakeLLM::replying(Ok(STRUCTURED_REPLY.to_string())), 100);

        client.analyze(LABEL).await;
        client.analyze(LABEL).await;

        assert_eq!(client.llm.connect_calls.load(Ordering::SeqCst), 1);
    }

    /// Store whose writes hold the calling thread.
    struct SlowStore {
        inner: InMemoryKeyValueStore,
        delay: Duration,
    }

    impl KeyValueStore for SlowStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            std::thread::sleep(self.delay);
            self.inner.set(key, value)
        }
    }

    #[tokio::test]
    async fn test_quota_writes_stay_off_the_runtime_thread() {
        let quota = QuotaTracker::new(
            SlowStore {
                inner: InMemoryKeyValueStore::new(),
                delay: Duration::from_millis(200),
            },
            SystemClock,
            QuotaConfig::default(),
        );
        let client = AiAnalysisClient::new(
            FakeLLM::replying(Ok(STRUCTURED_REPLY.to_string())),
            Arc::new(quota),
            OfflineRiskScorer::new(Arc::new(IngredientDatabase::empty())),
            &LLMConfig::default(),
        );

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = ticks.clone();
            async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        });

        let report = client.analyze(LABEL).await;
        ticker.abort();

        assert_eq!(report.source, ReportSource::Ai);
        assert_eq!(client.usage().await.count, 1);
        // the single-threaded runtime kept serving other tasks during the write
        assert!(ticks.load(Ordering::SeqCst) >= 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_are_spaced_out() {
        let client = client(FakeLLM::replying(Ok(STRUCTURED_REPLY.to_string())), 100);

        client.analyze(LABEL).await;
        client.analyze(LABEL).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        client.analyze(LABEL).await;

        let sent = client.llm.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent[1] - sent[0] >= Duration::from_secs(2));
        // enough time already passed, no extra wait
        assert!(sent[2] - sent[1] < Duration::from_secs(6));
        assert!(sent[2] - sent[1] >= Duration::from_secs(5));
    }
}
