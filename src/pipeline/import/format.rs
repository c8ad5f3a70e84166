use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pipeline::extraction::ExtractionError;

/// Extensions accepted by the parser, lowercase, with the leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".pdf", ".png", ".jpg", ".jpeg", ".tiff", ".bmp", ".docx", ".txt",
];

/// Broad document kinds; each one maps to exactly one extractor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Pdf,
    Image,
    Docx,
    Text,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Docx => "docx",
            Self::Text => "text",
        }
    }

    /// Whether the primary extractor for this kind is OCR.
    /// PDFs only need OCR on fallback, which is decided after native extraction.
    pub fn requires_ocr(&self) -> bool {
        matches!(self, Self::Image)
    }

    /// Map a lowercase extension (with leading dot) to a kind.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".pdf" => Some(Self::Pdf),
            ".png" | ".jpg" | ".jpeg" | ".tiff" | ".bmp" => Some(Self::Image),
            ".docx" => Some(Self::Docx),
            ".txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Lowercase extension of `path` with its leading dot, or "" when absent.
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Determine the format of `path` from its extension.
/// Fails fast on anything outside `SUPPORTED_EXTENSIONS`.
pub fn detect_format(path: &Path) -> Result<FormatKind, ExtractionError> {
    let extension = normalized_extension(path);
    FormatKind::from_extension(&extension).ok_or_else(|| ExtractionError::UnsupportedFormat {
        extension: if extension.is_empty() {
            "(none)".to_string()
        } else {
            extension
        },
        supported: SUPPORTED_EXTENSIONS.join(" "),
    })
}
