use std::io::{ErrorKind, Write};
use std::process::Command;

use super::capability::OCR_INSTALL_HINT;
use super::types::OcrEngine;
use super::{ExtractionError, OcrNeed};
use crate::config::ParserConfig;

/// Characters Tesseract may emit when the charset restriction is on:
/// alphanumerics plus common medical punctuation.
pub const OCR_CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,:-/()%";

/// Tesseract OCR driven through its command-line binary.
///
/// Every call writes the image to a temp file and blocks until the
/// subprocess exits.
pub struct TesseractCli {
    binary: String,
    language: String,
    page_segmentation_mode: u8,
    restrict_charset: bool,
}

impl TesseractCli {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            binary: config.tesseract_binary.clone(),
            language: config.ocr_language.clone(),
            page_segmentation_mode: config.ocr_page_segmentation_mode,
            restrict_charset: config.ocr_restrict_charset,
        }
    }

    /// Arguments following the input path.
    fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
            "--psm".to_string(),
            self.page_segmentation_mode.to_string(),
        ];
        if self.restrict_charset {
            args.push("-c".to_string());
            args.push(format!("tessedit_char_whitelist={OCR_CHAR_WHITELIST}"));
        }
        args
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut input = tempfile::Builder::new()
            .prefix("healthdoc-ocr-")
            .suffix(".png")
            .tempfile()?;
        input.write_all(image_bytes)?;
        input.flush()?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .args(self.arguments())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ExtractionError::OcrUnavailable {
                    need: OcrNeed::Image,
                    hint: OCR_INSTALL_HINT.to_string(),
                },
                _ => ExtractionError::OcrProcessing(format!("Failed to run {}: {e}", self.binary)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::OcrProcessing(stderr.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(
            language = %self.language,
            psm = self.page_segmentation_mode,
            chars = text.len(),
            "Tesseract recognition complete"
        );
        Ok(text)
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    pub text: String,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}
