use std::fmt;

use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Text acquired from one document, before cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExtraction {
    pub method: ExtractionMethod,
    pub text: String,
    pub page_count: usize,
    pub notes: Vec<DiagnosticNote>,
}

/// How text was acquired
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    PdfDirect,
    PdfOcrFallback,
    ImageOcr,
    DocxRead,
    PlainTextRead,
}

/// Text of a single PDF page from the native text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
}

/// Non-fatal caveat attached to a successful parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticNote {
    /// Native PDF reading threw; OCR fallback was used.
    NativePdfFailed { reason: String },
    /// Native PDF reading succeeded but returned (almost) no text.
    NativePdfInsufficient { chars: usize },
    /// Text came from OCR.
    OcrUsed { pages: usize },
    /// OCR produced nothing on some pages of a multi-page document.
    EmptyOcrPages { pages: Vec<usize> },
    /// Usable but short text.
    ShortText { chars: usize },
}

impl fmt::Display for DiagnosticNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativePdfFailed { reason } => {
                write!(f, "PDF text layer could not be read ({reason}); OCR was used instead")
            }
            Self::NativePdfInsufficient { chars } => write!(
                f,
                "PDF text layer held only {chars} characters; pages were OCR'd as a scanned document"
            ),
            Self::OcrUsed { pages } => write!(
                f,
                "Text was recognized by OCR from {pages} page(s); values may contain recognition errors"
            ),
            Self::EmptyOcrPages { pages } => {
                let list = pages
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "OCR found no text on page(s) {list}")
            }
            Self::ShortText { chars } => write!(
                f,
                "Short text extracted ({chars} characters); the document may be image-based"
            ),
        }
    }
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine {
    /// Recognize text in an encoded image (PNG, JPEG, ...).
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// PDF text-layer extraction abstraction
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError>;
}

/// PDF rasterization abstraction, used by the OCR fallback.
pub trait PdfPageRenderer {
    /// Render every page to an encoded image, in page order.
    fn render_pages(&self, pdf_bytes: &[u8], dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError>;
}
