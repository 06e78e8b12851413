use std::time::Duration;

use thiserror::Error;

/// Output of a single recognition pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    pub confidence: Option<f32>,
}

/// Text read from one label image. Scoped to a single scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub raw: String,
    pub clean: String,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("OCR engine initialization failed: {0}")]
    EngineInit(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("text recognition failed: {0}")]
    Recognition(String),

    #[error("text recognition timed out after {0:?}")]
    Timeout(Duration),

    #[error("extracted text too short ({length} characters)")]
    InsufficientText { length: usize },
}

impl ExtractionError {
    /// Message safe to show to the person holding the camera.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExtractionError::InsufficientText { .. } => {
                "Could not extract readable text from the image. Please ensure the label is clearly visible and well-lit."
            }
            ExtractionError::InvalidImage(_) => {
                "The image could not be read. Please capture the label again."
            }
            ExtractionError::EngineInit(_)
            | ExtractionError::Recognition(_)
            | ExtractionError::Timeout(_) => {
                "Failed to extract text from image. Please try again with better lighting."
            }
        }
    }
}
