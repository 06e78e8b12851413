use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::domain::{
    common::OcrConfig,
    extraction::{
        entities::{ExtractedText, ExtractionError},
        helpers::{MIN_TEXT_LENGTH, clean_extracted_text},
        ports::OcrEngine,
        preprocessing::preprocess_image,
    },
};

/// Turns label photos into cleaned text using a lazily started OCR engine.
///
/// The engine is initialized on first use and reused for every later call
/// until [`TextExtractor::shutdown`].
pub struct TextExtractor<E>
where
    E: OcrEngine,
{
    engine: E,
    timeout: Duration,
    ready: Mutex<bool>,
}

impl<E> TextExtractor<E>
where
    E: OcrEngine,
{
    pub fn new(engine: E, config: &OcrConfig) -> Self {
        Self {
            engine,
            timeout: config.timeout,
            ready: Mutex::new(false),
        }
    }

    /// Starts the engine if it is not running yet. Concurrent callers wait
    /// for the same initialization.
    pub async fn initialize(&self) -> Result<(), ExtractionError> {
        let mut ready = self.ready.lock().await;
        if *ready {
            return Ok(());
        }

        self.engine.initialize().await.inspect_err(|e| {
            warn!(error = %e, "OCR engine failed to start");
        })?;

        *ready = true;
        info!("OCR engine ready");
        Ok(())
    }

    pub async fn is_ready(&self) -> bool {
        *self.ready.lock().await
    }

    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    pub async fn extract(&self, image: Bytes) -> Result<ExtractedText, ExtractionError> {
        let prepared = tokio::task::spawn_blocking(move || preprocess_image(&image))
            .await
            .map_err(|e| ExtractionError::Recognition(format!("preprocessing task failed: {e}")))??;

        self.initialize().await?;

        let recognized = tokio::time::timeout(self.timeout, self.engine.recognize(Bytes::from(prepared)))
            .await
            .map_err(|_| ExtractionError::Timeout(self.timeout))??;

        let clean = clean_extracted_text(&recognized.text);
        let length = clean.chars().count();
        if length < MIN_TEXT_LENGTH {
            warn!(length, "not enough readable text on label");
            return Err(ExtractionError::InsufficientText { length });
        }

        info!(length, confidence = ?recognized.confidence, "label text extracted");

        Ok(ExtractedText {
            raw: recognized.text,
            clean,
            confidence: recognized.confidence,
        })
    }

    /// Releases the engine. The next extraction starts it again.
    pub async fn shutdown(&self) {
        let mut ready = self.ready.lock().await;
        if *ready {
            self.engine.shutdown().await;
            *ready = false;
            info!("OCR engine stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Cursor,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    use super::*;
    use crate::domain::extraction::entities::RecognizedText;

    struct FakeEngine {
        text: String,
        fail_init: bool,
        delay: Duration,
        init_calls: AtomicUsize,
        shutdown_calls: AtomicUsize,
    }

    impl FakeEngine {
        fn returning(text: &str) -> Self {
            Self {
                text: text.to_string(),
                fail_init: false,
                delay: Duration::ZERO,
                init_calls: AtomicUsize::new(0),
                shutdown_calls: AtomicUsize::new(0),
            }
        }
    }

    impl OcrEngine for FakeEngine {
        async fn initialize(&self) -> Result<(), ExtractionError> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_init {
                return Err(ExtractionError::EngineInit("no engine".to_string()));
            }
            Ok(())
        }

        async fn recognize(&self, _image: Bytes) -> Result<RecognizedText, ExtractionError> {
            tokio::time::sleep(self.delay).await;
            Ok(RecognizedText {
                text: self.text.clone(),
                confidence: Some(87.5),
            })
        }

        async fn shutdown(&self) {
            self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn label_png() -> Bytes {
        let image = RgbaImage::from_pixel(16, 16, Rgba([240, 240, 240, 255]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        Bytes::from(buffer.into_inner())
    }

    fn config(timeout: Duration) -> OcrConfig {
        OcrConfig {
            timeout,
            ..OcrConfig::default()
        }
    }

    #[tokio::test]
    async fn test_extract_cleans_text() {
        let extractor = TextExtractor::new(
            FakeEngine::returning("INGREDIENTS:\nWater,  Sugar™, Salt"),
            &config(Duration::from_secs(5)),
        );

        let extracted = extractor.extract(label_png()).await.unwrap();
        assert_eq!(extracted.clean, "INGREDIENTS: Water, Sugar, Salt");
        assert_eq!(extracted.confidence, Some(87.5));
    }

    #[tokio::test]
    async fn test_engine_is_initialized_once() {
        let extractor = TextExtractor::new(
            FakeEngine::returning("Water, Sugar, Salt"),
            &config(Duration::from_secs(5)),
        );

        extractor.extract(label_png()).await.unwrap();
        extractor.extract(label_png()).await.unwrap();
        extractor.initialize().await.unwrap();

        assert_eq!(extractor.engine.init_calls.load(Ordering::SeqCst), 1);
        assert!(extractor.is_ready().await);
    }

    #[tokio::test]
    async fn test_shutdown_allows_restart() {
        let extractor = TextExtractor::new(
            FakeEngine::returning("Water, Sugar, Salt"),
            &config(Duration::from_secs(5)),
        );

        extractor.shutdown().await;
        assert_eq!(extractor.engine.shutdown_calls.load(Ordering::SeqCst), 0);

        extractor.initialize().await.unwrap();
        extractor.shutdown().await;
        assert!(!extractor.is_ready().await);

        extractor.extract(label_png()).await.unwrap();
        assert_eq!(extractor.engine.init_calls.load(Ordering::SeqCst), 2);
        assert_eq!(extractor.engine.shutdown_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_text_is_insufficient() {
        let extractor =
            TextExtractor::new(FakeEngine::returning(" ab | c "), &config(Duration::from_secs(5)));

        let result = extractor.extract(label_png()).await;
        assert_eq!(result, Err(ExtractionError::InsufficientText { length: 2 }));
    }

    #[tokio::test]
    async fn test_invalid_image_skips_engine_start() {
        let extractor = TextExtractor::new(
            FakeEngine::returning("Water, Sugar, Salt"),
            &config(Duration::from_secs(5)),
        );

        let result = extractor.extract(Bytes::from_static(b"not an image")).await;
        assert!(matches!(result, Err(ExtractionError::InvalidImage(_))));
        assert_eq!(extractor.engine.init_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_init_failure_is_reported_and_retried() {
        let mut engine = FakeEngine::returning("Water, Sugar, Salt");
        engine.fail_init = true;
        let extractor = TextExtractor::new(engine, &config(Duration::from_secs(5)));

        let result = extractor.extract(label_png()).await;
        assert!(matches!(result, Err(ExtractionError::EngineInit(_))));
        assert!(!extractor.is_ready().await);

        let _ = extractor.extract(label_png()).await;
        assert_eq!(extractor.engine.init_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_recognition_timeout() {
        let mut engine = FakeEngine::returning("Water, Sugar, Salt");
        engine.delay = Duration::from_millis(200);
        let extractor = TextExtractor::new(engine, &config(Duration::from_millis(20)));

        let result = extractor.extract(label_png()).await;
        assert_eq!(result, Err(ExtractionError::Timeout(Duration::from_millis(20))));
    }
}
