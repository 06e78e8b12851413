use std::future::Future;

use bytes::Bytes;

use crate::domain::{
    analysis::{AiAnalysisClient, AnalysisReport, LLMClient},
    extraction::{ExtractedText, ExtractionError, OcrEngine, TextExtractor},
    quota::{Clock, KeyValueStore},
};

/// Image to text stage of a scan
pub trait LabelReader: Send + Sync {
    fn read_label(
        &self,
        image: Bytes,
    ) -> impl Future<Output = Result<ExtractedText, ExtractionError>> + Send;
}

/// Text to report stage of a scan. Infallible by contract.
pub trait LabelAnalyzer: Send + Sync {
    fn analyze_label(&self, text: &str) -> impl Future<Output = AnalysisReport> + Send;
}

impl<E> LabelReader for TextExtractor<E>
where
    E: OcrEngine,
{
    fn read_label(
        &self,
        image: Bytes,
    ) -> impl Future<Output = Result<ExtractedText, ExtractionError>> + Send {
        self.extract(image)
    }
}

impl<L, S, C> LabelAnalyzer for AiAnalysisClient<L, S, C>
where
    L: LLMClient,
    S: KeyValueStore + 'static,
    C: Clock + 'static,
{
    fn analyze_label(&self, text: &str) -> impl Future<Output = AnalysisReport> + Send {
        self.analyze(text)
    }
}
