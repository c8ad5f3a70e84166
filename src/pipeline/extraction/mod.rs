pub mod types;
pub mod capability;
pub mod sanitize;
pub mod preprocess;
pub mod pdf;
pub mod pdf_renderer;
pub mod ocr;
pub mod docx;
pub mod text_only;
pub mod orchestrator;

pub use types::*;
pub use capability::*;
pub use sanitize::*;
pub use preprocess::*;
pub use pdf::*;
pub use pdf_renderer::*;
pub use ocr::*;
pub use docx::*;
pub use text_only::*;
pub use orchestrator::*;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why OCR was needed when it turned out to be unavailable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OcrNeed {
    /// The document is an image; OCR is the only extractor.
    Image,
    /// A PDF had no usable text layer and needed page rasterization + OCR.
    ScannedPdf,
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported file format: {extension} (supported: {supported})")]
    UnsupportedFormat { extension: String, supported: String },

    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("{}", ocr_unavailable_message(.need, .hint))]
    OcrUnavailable { need: OcrNeed, hint: String },

    #[error("Extracted text too short ({chars} characters, minimum {minimum})")]
    ExtractionQuality { chars: usize, minimum: usize },

    #[error("Could not read {format} document: {reason}")]
    FormatReader { format: &'static str, reason: String },

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("Text encoding error: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn ocr_unavailable_message(need: &OcrNeed, hint: &str) -> String {
    match need {
        OcrNeed::Image => format!("OCR is not available for image documents. {hint}"),
        OcrNeed::ScannedPdf => format!(
            "This PDF has no usable text layer (likely scanned) and OCR is not available. {hint}"
        ),
    }
}

impl ExtractionError {
    /// Operator-actionable hint for the failure.
    pub fn remediation(&self) -> String {
        match self {
            Self::UnsupportedFormat { supported, .. } => {
                format!("Convert the document to one of: {supported}")
            }
            Self::SourceNotFound(_) => {
                "Check that the file path is correct and the file is readable".to_string()
            }
            Self::OcrUnavailable { hint, .. } => hint.clone(),
            Self::ExtractionQuality { .. } => {
                "The document yielded almost no text; try a higher-quality scan or photo".to_string()
            }
            Self::FormatReader { format, .. } => {
                format!("The {format} file appears corrupt; re-export or re-save it and try again")
            }
            Self::OcrProcessing(_) => {
                "OCR failed on this image; check that it opens in an image viewer".to_string()
            }
            Self::Encoding(_) => "Save the text file as UTF-8 and try again".to_string(),
            Self::Io(_) => "Check that the file is readable".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_unavailable_messages_distinguish_need() {
        let image = ExtractionError::OcrUnavailable {
            need: OcrNeed::Image,
            hint: "Install Tesseract".into(),
        };
        let scanned = ExtractionError::OcrUnavailable {
            need: OcrNeed::ScannedPdf,
            hint: "Install Tesseract".into(),
        };
        assert!(image.to_string().contains("image documents"));
        assert!(scanned.to_string().contains("scanned"));
        assert!(scanned.to_string().contains("Install Tesseract"));
    }

    #[test]
    fn every_failure_has_specific_remediation() {
        let errors = [
            ExtractionError::UnsupportedFormat {
                extension: ".xyz".into(),
                supported: ".pdf .txt".into(),
            },
            ExtractionError::SourceNotFound(PathBuf::from("/missing.pdf")),
            ExtractionError::ExtractionQuality { chars: 2, minimum: 10 },
            ExtractionError::FormatReader {
                format: "docx",
                reason: "zip error".into(),
            },
            ExtractionError::Encoding("invalid utf-8".into()),
        ];
        for err in &errors {
            let hint = err.remediation();
            assert!(!hint.is_empty());
            assert!(!hint.to_lowercase().contains("error occurred"));
        }
        assert!(errors[0].remediation().contains(".pdf .txt"));
        assert!(errors[2].remediation().contains("scan"));
    }

    #[test]
    fn quality_and_unavailable_are_distinct_kinds() {
        let quality = ExtractionError::ExtractionQuality { chars: 3, minimum: 10 };
        assert!(!matches!(quality, ExtractionError::OcrUnavailable { .. }));
        assert!(quality.to_string().contains("3 characters"));
    }
}
