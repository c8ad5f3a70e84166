//! PDF page rasterization for the OCR fallback.
//!
//! Shells out to Poppler's `pdftoppm`, which renders every page of a PDF
//! to grayscale PNG files in a temp directory. Pages are read back in page
//! order and the directory is removed on drop.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use super::capability::RASTERIZER_INSTALL_HINT;
use super::preprocess::encode_png;
use super::types::PdfPageRenderer;
use super::{ExtractionError, OcrNeed};
use crate::config::ParserConfig;

/// Output file prefix inside the render directory.
const PAGE_PREFIX: &str = "page";

/// Renders PDF pages to PNG images with `pdftoppm`.
pub struct PdftoppmRenderer {
    binary: String,
}

impl PdftoppmRenderer {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            binary: config.pdftoppm_binary.clone(),
        }
    }
}

impl PdfPageRenderer for PdftoppmRenderer {
    fn render_pages(&self, pdf_bytes: &[u8], dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError> {
        let dir = tempfile::Builder::new().prefix("healthdoc-render-").tempdir()?;
        let pdf_path = dir.path().join("input.pdf");
        std::fs::write(&pdf_path, pdf_bytes)?;

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-gray")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(&pdf_path)
            .arg(dir.path().join(PAGE_PREFIX))
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ExtractionError::OcrUnavailable {
                    need: OcrNeed::ScannedPdf,
                    hint: RASTERIZER_INSTALL_HINT.to_string(),
                },
                _ => ExtractionError::FormatReader {
                    format: "pdf",
                    reason: format!("Failed to run {}: {e}", self.binary),
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::FormatReader {
                format: "pdf",
                reason: format!("Page rendering failed: {}", stderr.trim()),
            });
        }

        let mut page_files: Vec<PathBuf> = std::fs::read_dir(dir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension().is_some_and(|ext| ext == "png")
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(PAGE_PREFIX))
            })
            .collect();
        // pdftoppm zero-pads page numbers to a common width
        page_files.sort();

        let pages = page_files
            .iter()
            .map(std::fs::read)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(pages = pages.len(), dpi, "PDF pages rendered");
        Ok(pages)
    }
}

/// Mock renderer: a fixed number of blank pages.
pub struct MockPdfPageRenderer {
    pub pages: usize,
}

impl PdfPageRenderer for MockPdfPageRenderer {
    fn render_pages(&self, _pdf_bytes: &[u8], _dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError> {
        let img = image::GrayImage::from_pixel(32, 32, image::Luma([200u8]));
        let png = encode_png(&image::DynamicImage::ImageLuma8(img))?;
        Ok(vec![png; self.pages])
    }
}
