use std::{path::PathBuf, process::Stdio};

use bytes::Bytes;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, info};

use crate::domain::{
    common::OcrConfig,
    extraction::{ExtractionError, OcrEngine, RecognizedText},
};

/// Characters Tesseract may emit. Anything else on a label is noise.
pub const CHARACTER_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,()%/-: ";

/// Fully automatic page segmentation without OSD.
const PAGE_SEGMENTATION_MODE: &str = "3";

/// OCR through the `tesseract` command line tool. Images go in on stdin and
/// text comes back on stdout.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            language: config.language.clone(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.kill_on_drop(true);
        command
    }
}

impl OcrEngine for TesseractEngine {
    async fn initialize(&self) -> Result<(), ExtractionError> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                ExtractionError::EngineInit(format!("cannot run {}: {e}", self.binary.display()))
            })?;

        if !output.status.success() {
            return Err(ExtractionError::EngineInit(format!(
                "{} --version exited with {}",
                self.binary.display(),
                output.status
            )));
        }

        // older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        let version = String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        info!(%version, language = %self.language, "Tesseract OCR initialized");
        Ok(())
    }

    async fn recognize(&self, image: Bytes) -> Result<RecognizedText, ExtractionError> {
        let mut child = self
            .command()
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(PAGE_SEGMENTATION_MODE)
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={CHARACTER_WHITELIST}"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExtractionError::Recognition(format!("cannot start tesseract: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExtractionError::Recognition("tesseract stdin unavailable".to_string()))?;
        stdin
            .write_all(&image)
            .await
            .map_err(|e| ExtractionError::Recognition(format!("cannot send image: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExtractionError::Recognition(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(length = text.len(), "Tesseract recognition finished");

        Ok(RecognizedText {
            text,
            confidence: None,
        })
    }
}
