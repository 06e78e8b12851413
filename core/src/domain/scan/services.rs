use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::{
    analysis::AnalysisReport,
    common::generate_uuid_v7,
    scan::{
        entities::{ScanError, ScanProgress, ScanStage},
        ports::{LabelAnalyzer, LabelReader},
    },
};

pub const CAPTURING_PERCENT: u8 = 0;
pub const EXTRACTING_PERCENT: u8 = 10;
pub const EXTRACTED_PERCENT: u8 = 50;
pub const ANALYZING_PERCENT: u8 = 60;
pub const COMPLETE_PERCENT: u8 = 100;

/// Runs a scan end to end: image, extracted text, report.
///
/// Only one scan runs per orchestrator at a time. The orchestrator is cheap
/// to clone and clones share the busy flag.
pub struct ScanOrchestrator<R, A>
where
    R: LabelReader,
    A: LabelAnalyzer,
{
    reader: Arc<R>,
    analyzer: Arc<A>,
    active: Arc<AtomicBool>,
}

impl<R, A> Clone for ScanOrchestrator<R, A>
where
    R: LabelReader,
    A: LabelAnalyzer,
{
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            analyzer: self.analyzer.clone(),
            active: self.active.clone(),
        }
    }
}

/// Marks the orchestrator busy until dropped.
#[derive(Debug)]
pub struct ScanSlot {
    active: Arc<AtomicBool>,
}

impl Drop for ScanSlot {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

/// A scan running in the background.
///
/// Dropping the handle abandons the scan: the task keeps running to
/// completion but its result is discarded, and the orchestrator accepts a
/// new scan immediately.
pub struct ScanHandle {
    scan_id: Uuid,
    progress: watch::Receiver<ScanProgress>,
    task: JoinHandle<Result<AnalysisReport, ScanError>>,
    _slot: ScanSlot,
}

impl ScanHandle {
    pub fn scan_id(&self) -> Uuid {
        self.scan_id
    }

    /// Latest published progress.
    pub fn latest(&self) -> ScanProgress {
        self.progress.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanProgress> {
        self.progress.clone()
    }

    pub async fn result(self) -> Result<AnalysisReport, ScanError> {
        self.task.await.map_err(|e| {
            error!(scan_id = %self.scan_id, error = %e, "Scan task ended without a result");
            ScanError::Abandoned
        })?
    }

    pub fn abandon(self) {
        debug!(scan_id = %self.scan_id, "Scan abandoned");
    }
}

impl<R, A> ScanOrchestrator<R, A>
where
    R: LabelReader + 'static,
    A: LabelAnalyzer + 'static,
{
    pub fn new(reader: Arc<R>, analyzer: Arc<A>) -> Self {
        Self {
            reader,
            analyzer,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }

    pub fn analyzer(&self) -> &Arc<A> {
        &self.analyzer
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Runs a full scan and waits for its report.
    ///
    /// The scan itself runs on a background task: dropping this future
    /// abandons the scan like dropping a [`ScanHandle`] does, without
    /// cancelling OCR or an AI request that is already in flight.
    pub async fn run(&self, image: Bytes) -> Result<AnalysisReport, ScanError> {
        self.spawn(image)?.result().await
    }

    /// Starts a scan on a background task.
    pub fn spawn(&self, image: Bytes) -> Result<ScanHandle, ScanError> {
        let slot = self.acquire()?;
        let scan_id = generate_uuid_v7();
        let (sender, progress) = watch::channel(initial_progress(scan_id));

        let orchestrator = self.clone();
        let task =
            tokio::spawn(async move { orchestrator.execute(scan_id, image, &sender).await });

        Ok(ScanHandle {
            scan_id,
            progress,
            task,
            _slot: slot,
        })
    }

    /// Analysis stage only, for text that did not come from a photo.
    ///
    /// Detached like [`run`](Self::run) so a dispatched AI call is always
    /// seen through to its quota record.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisReport, ScanError> {
        let _slot = self.acquire()?;
        let analyzer = self.analyzer.clone();
        let text = text.to_string();

        tokio::spawn(async move { analyzer.analyze_label(&text).await })
            .await
            .map_err(|e| {
                error!(error = %e, "Text analysis task ended without a result");
                ScanError::Abandoned
            })
    }

    fn acquire(&self) -> Result<ScanSlot, ScanError> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ScanError::Busy)?;

        Ok(ScanSlot {
            active: self.active.clone(),
        })
    }

    #[instrument(skip(self, image, progress), fields(image_bytes = image.len()))]
    async fn execute(
        &self,
        scan_id: Uuid,
        image: Bytes,
        progress: &watch::Sender<ScanProgress>,
    ) -> Result<AnalysisReport, ScanError> {
        let publish = |stage, percent, message: &str| {
            progress.send_replace(ScanProgress::new(scan_id, stage, percent, message));
        };

        publish(
            ScanStage::Extracting,
            EXTRACTING_PERCENT,
            "Extracting text from ingredient label",
        );

        let extracted = match self.reader.read_label(image).await {
            Ok(extracted) => extracted,
            Err(e) => {
                error!(%scan_id, error = %e, "Text extraction failed");
                let percent = progress.borrow().percent;
                publish(ScanStage::Failed, percent, e.user_message());
                return Err(e.into());
            }
        };

        publish(ScanStage::Extracting, EXTRACTED_PERCENT, "Text extracted");
        publish(
            ScanStage::Analyzing,
            ANALYZING_PERCENT,
            "Evaluating ingredient safety",
        );

        let report = self.analyzer.analyze_label(&extracted.clean).await;

        publish(ScanStage::Complete, COMPLETE_PERCENT, "Analysis complete");
        info!(
            %scan_id,
            health_score = report.health_score,
            source = ?report.source,
            "Scan complete"
        );

        Ok(report)
    }
}

fn initial_progress(scan_id: Uuid) -> ScanProgress {
    ScanProgress::new(
        scan_id,
        ScanStage::Capturing,
        CAPTURING_PERCENT,
        "Preparing image for analysis",
    )
}
