use std::future::Future;

use bytes::Bytes;

use crate::domain::extraction::entities::{ExtractionError, RecognizedText};

/// External OCR engine
pub trait OcrEngine: Send + Sync {
    /// Prepares the engine for recognition. Called once before first use and
    /// again only after [`OcrEngine::shutdown`].
    fn initialize(&self) -> impl Future<Output = Result<(), ExtractionError>> + Send;

    /// Recognizes text in a preprocessed PNG image.
    fn recognize(
        &self,
        image: Bytes,
    ) -> impl Future<Output = Result<RecognizedText, ExtractionError>> + Send;

    fn shutdown(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}
