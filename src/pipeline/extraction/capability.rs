//! OCR availability, probed once and injected into the parser.
//!
//! The probe shells out to `tesseract --version` and `pdftoppm -v`. Parsers
//! receive the result as a plain value, so tests can construct "OCR missing"
//! deterministically without touching the host system.

use std::process::{Command, Stdio};

use serde::Serialize;

use super::{ExtractionError, OcrNeed};
use crate::config::ParserConfig;

/// Install hint shown whenever OCR is required but missing.
pub const OCR_INSTALL_HINT: &str = "Install Tesseract OCR (macOS: brew install tesseract, \
Debian/Ubuntu: sudo apt-get install tesseract-ocr)";

/// Install hint for the PDF rasterizer used on scanned PDFs.
pub const RASTERIZER_INSTALL_HINT: &str = "Install Poppler for pdftoppm (macOS: brew install poppler, \
Debian/Ubuntu: sudo apt-get install poppler-utils)";

/// Process-wide OCR capability flags. Read-only after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OcrCapabilities {
    /// OCR engine binary responds to a version probe.
    pub ocr: bool,
    /// PDF page rasterizer binary is present.
    pub rasterizer: bool,
}

impl OcrCapabilities {
    /// Probe the configured binaries.
    pub fn probe(config: &ParserConfig) -> Self {
        let ocr = binary_succeeds(&config.tesseract_binary, "--version");
        // pdftoppm -v prints to stderr and exits non-zero on some versions;
        // a successful spawn is enough.
        let rasterizer = binary_spawns(&config.pdftoppm_binary, "-v");

        if ocr {
            tracing::info!(binary = %config.tesseract_binary, "OCR engine available");
        } else {
            tracing::warn!(
                binary = %config.tesseract_binary,
                "OCR engine not found; image documents and scanned PDFs will be rejected"
            );
        }
        if !rasterizer {
            tracing::warn!(
                binary = %config.pdftoppm_binary,
                "PDF rasterizer not found; scanned PDFs will be rejected"
            );
        }

        Self { ocr, rasterizer }
    }

    pub fn available() -> Self {
        Self {
            ocr: true,
            rasterizer: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            ocr: false,
            rasterizer: false,
        }
    }

    /// Fail with `OcrUnavailable` unless everything `need` depends on is present.
    pub fn ensure(&self, need: OcrNeed) -> Result<(), ExtractionError> {
        if !self.ocr {
            return Err(ExtractionError::OcrUnavailable {
                need,
                hint: OCR_INSTALL_HINT.to_string(),
            });
        }
        if need == OcrNeed::ScannedPdf && !self.rasterizer {
            return Err(ExtractionError::OcrUnavailable {
                need,
                hint: RASTERIZER_INSTALL_HINT.to_string(),
            });
        }
        Ok(())
    }
}

fn binary_succeeds(binary: &str, arg: &str) -> bool {
    Command::new(binary)
        .arg(arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn binary_spawns(binary: &str, arg: &str) -> bool {
    Command::new(binary)
        .arg(arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_rejects_images_with_install_hint() {
        let caps = OcrCapabilities::unavailable();
        match caps.ensure(OcrNeed::Image) {
            Err(ExtractionError::OcrUnavailable { need, hint }) => {
                assert_eq!(need, OcrNeed::Image);
                assert!(hint.contains("tesseract"));
            }
            other => panic!("Expected OcrUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn missing_rasterizer_only_blocks_scanned_pdfs() {
        let caps = OcrCapabilities {
            ocr: true,
            rasterizer: false,
        };
        assert!(caps.ensure(OcrNeed::Image).is_ok());
        match caps.ensure(OcrNeed::ScannedPdf) {
            Err(ExtractionError::OcrUnavailable { need, hint }) => {
                assert_eq!(need, OcrNeed::ScannedPdf);
                assert!(hint.contains("pdftoppm"));
            }
            other => panic!("Expected OcrUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn available_accepts_everything() {
        let caps = OcrCapabilities::available();
        assert!(caps.ensure(OcrNeed::Image).is_ok());
        assert!(caps.ensure(OcrNeed::ScannedPdf).is_ok());
    }

    #[test]
    fn probe_with_missing_binaries_reports_unavailable() {
        let config = ParserConfig {
            tesseract_binary: "/nonexistent/tesseract-binary".into(),
            pdftoppm_binary: "/nonexistent/pdftoppm-binary".into(),
            ..ParserConfig::default()
        };
        assert_eq!(OcrCapabilities::probe(&config), OcrCapabilities::unavailable());
    }
}
