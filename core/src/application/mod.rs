use std::sync::Arc;

use tracing::info;

use crate::{
    domain::{
        analysis::{AiAnalysisClient, AnalysisReport, OfflineRiskScorer},
        common::{LabelScanConfig, entities::app_errors::CoreError},
        extraction::TextExtractor,
        ingredient::IngredientDatabase,
        quota::{QuotaTracker, UsageStats},
        scan::{ScanError, ScanHandle, ScanOrchestrator},
    },
    infrastructure::{
        clock::SystemClock, dataset::load_ingredient_database, llm::GeminiLLMClient,
        ocr::TesseractEngine, storage::FileKeyValueStore,
    },
};

pub type LabelScanQuota = QuotaTracker<FileKeyValueStore, SystemClock>;
pub type LabelScanAnalyzer = AiAnalysisClient<GeminiLLMClient, FileKeyValueStore, SystemClock>;
pub type LabelScanExtractor = TextExtractor<TesseractEngine>;
pub type LabelScanOrchestrator = ScanOrchestrator<LabelScanExtractor, LabelScanAnalyzer>;

/// Every component of the scanner, wired together once at startup.
#[derive(Clone)]
pub struct LabelScanService {
    orchestrator: LabelScanOrchestrator,
    ingredients: Arc<IngredientDatabase>,
}

impl LabelScanService {
    pub fn orchestrator(&self) -> &LabelScanOrchestrator {
        &self.orchestrator
    }

    pub fn ingredients(&self) -> &IngredientDatabase {
        &self.ingredients
    }

    pub fn quota(&self) -> &Arc<LabelScanQuota> {
        self.orchestrator.analyzer().quota()
    }

    pub async fn scan(&self, image: bytes::Bytes) -> Result<AnalysisReport, ScanError> {
        self.orchestrator.run(image).await
    }

    pub fn spawn_scan(&self, image: bytes::Bytes) -> Result<ScanHandle, ScanError> {
        self.orchestrator.spawn(image)
    }

    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisReport, ScanError> {
        self.orchestrator.analyze_text(text).await
    }

    pub async fn usage(&self) -> UsageStats {
        self.orchestrator.analyzer().usage().await
    }

    /// Stops the OCR engine. Later scans start it again.
    pub async fn shutdown(&self) {
        self.orchestrator.reader().shutdown().await;
    }
}

pub fn create_service(config: LabelScanConfig) -> Result<LabelScanService, CoreError> {
    let ingredients = Arc::new(load_ingredient_database(&config.dataset));

    let store = FileKeyValueStore::new(&config.storage.data_dir)?;
    let quota = Arc::new(QuotaTracker::new(store, SystemClock, config.quota.clone()));

    let llm = GeminiLLMClient::new(&config.llm)
        .map_err(|e| CoreError::Configuration(e.to_string()))?;
    let ai_enabled = llm.is_configured();

    let analyzer = AiAnalysisClient::new(
        llm,
        quota,
        OfflineRiskScorer::new(ingredients.clone()),
        &config.llm,
    );
    let extractor = TextExtractor::new(TesseractEngine::new(&config.ocr), &config.ocr);

    info!(
        ai_enabled,
        model = %config.llm.gemini_model,
        data_dir = %config.storage.data_dir.display(),
        "LabelScan service created"
    );

    Ok(LabelScanService {
        orchestrator: ScanOrchestrator::new(Arc::new(extractor), Arc::new(analyzer)),
        ingredients,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::{
        analysis::ReportSource,
        common::{DatasetConfig, LLMConfig, OcrConfig, QuotaConfig, StorageConfig},
    };

    fn config() -> LabelScanConfig {
        LabelScanConfig {
            llm: LLMConfig::default(),
            quota: QuotaConfig::default(),
            ocr: OcrConfig::default(),
            storage: StorageConfig {
                data_dir: std::env::temp_dir().join(format!("labelscan-{}", uuid::Uuid::new_v4())),
            },
            dataset: DatasetConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_text_analysis_without_api_key_runs_offline() {
        let service = create_service(config()).unwrap();

        let report = service
            .analyze_text("INGREDIENTS: Water, Partially Hydrogenated Oil, Salt")
            .await
            .unwrap();

        assert_eq!(report.source, ReportSource::Offline);
        assert_eq!(report.health_score, 8);
        assert_eq!(
            report.categories.high_concern,
            vec!["Partially Hydrogenated Oil"]
        );
        assert_eq!(service.usage().await.count, 0);
    }

    #[test]
    fn test_unusable_data_dir_is_storage_error() {
        let mut config = config();
        config.storage.data_dir = PathBuf::from("/dev/null/labelscan");

        assert!(matches!(
            create_service(config),
            Err(CoreError::Storage(_))
        ));
    }
}
