use std::path::Path;

use super::capability::OcrCapabilities;
use super::docx::extract_docx_text;
use super::pdf::join_pages;
use super::preprocess::prepare_for_ocr;
use super::text_only::read_plain_text;
use super::types::{
    DiagnosticNote, ExtractionMethod, OcrEngine, PageText, PdfExtractor, PdfPageRenderer,
    RawExtraction,
};
use super::{ExtractionError, OcrNeed};
use crate::config::ParserConfig;
use crate::pipeline::import::FormatKind;

/// Outcome of reading the native PDF text layer.
#[derive(Debug)]
enum NativeOutcome {
    Usable(Vec<PageText>),
    Insufficient { chars: usize },
    Failed(String),
}

/// Per-format text acquisition with the native PDF → OCR fallback chain.
/// Uses trait objects for OCR and PDF access, enabling dependency injection.
pub struct DocumentExtractor {
    config: ParserConfig,
    capabilities: OcrCapabilities,
    ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
    pdf_renderer: Box<dyn PdfPageRenderer + Send + Sync>,
}

impl DocumentExtractor {
    pub fn new(
        config: ParserConfig,
        capabilities: OcrCapabilities,
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
        pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
        pdf_renderer: Box<dyn PdfPageRenderer + Send + Sync>,
    ) -> Self {
        Self {
            config,
            capabilities,
            ocr_engine,
            pdf_extractor,
            pdf_renderer,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn capabilities(&self) -> OcrCapabilities {
        self.capabilities
    }

    /// Acquire raw text from `path` with the extractor for `kind`.
    pub fn extract(&self, path: &Path, kind: FormatKind) -> Result<RawExtraction, ExtractionError> {
        let bytes = std::fs::read(path)?;

        let mut extraction = match kind {
            FormatKind::Pdf => self.extract_pdf(&bytes)?,
            FormatKind::Image => self.extract_image(&bytes)?,
            FormatKind::Docx => RawExtraction {
                method: ExtractionMethod::DocxRead,
                text: extract_docx_text(&bytes)?,
                page_count: 1,
                notes: vec![],
            },
            FormatKind::Text => RawExtraction {
                method: ExtractionMethod::PlainTextRead,
                text: read_plain_text(bytes)?,
                page_count: 1,
                notes: vec![],
            },
        };

        let chars = content_chars(&extraction.text);
        if chars < self.config.short_text_chars {
            extraction.notes.push(DiagnosticNote::ShortText { chars });
        }

        Ok(extraction)
    }

    /// Native text layer first; OCR of rendered pages when it fails or is empty.
    fn extract_pdf(&self, pdf_bytes: &[u8]) -> Result<RawExtraction, ExtractionError> {
        let mut notes = Vec::new();

        let pages = match self.read_native(pdf_bytes) {
            NativeOutcome::Usable(pages) => {
                tracing::debug!(pages = pages.len(), "PDF text layer usable");
                return Ok(RawExtraction {
                    method: ExtractionMethod::PdfDirect,
                    text: join_pages(&pages),
                    page_count: pages.len(),
                    notes,
                });
            }
            NativeOutcome::Insufficient { chars } => {
                tracing::warn!(chars, "PDF text layer insufficient, falling back to OCR");
                notes.push(DiagnosticNote::NativePdfInsufficient { chars });
                self.ocr_pdf(pdf_bytes)?
            }
            NativeOutcome::Failed(reason) => {
                tracing::warn!(reason = %reason, "PDF text layer unreadable, falling back to OCR");
                notes.push(DiagnosticNote::NativePdfFailed { reason });
                self.ocr_pdf(pdf_bytes)?
            }
        };

        let empty_pages: Vec<usize> = pages
            .iter()
            .filter(|p| p.text.trim().is_empty())
            .map(|p| p.page_number)
            .collect();
        notes.push(DiagnosticNote::OcrUsed { pages: pages.len() });
        if !empty_pages.is_empty() && empty_pages.len() < pages.len() {
            notes.push(DiagnosticNote::EmptyOcrPages { pages: empty_pages.clone() });
        }

        tracing::debug!(pages = pages.len(), empty = empty_pages.len(), "PDF OCR fallback complete");
        Ok(RawExtraction {
            method: ExtractionMethod::PdfOcrFallback,
            text: join_pages(&pages),
            page_count: pages.len(),
            notes,
        })
    }

    fn read_native(&self, pdf_bytes: &[u8]) -> NativeOutcome {
        match self.pdf_extractor.extract_text(pdf_bytes) {
            Ok(pages) => {
                let chars: usize = pages.iter().map(|p| content_chars(&p.text)).sum();
                if pages.is_empty() || chars < self.config.min_text_chars {
                    NativeOutcome::Insufficient { chars }
                } else {
                    NativeOutcome::Usable(pages)
                }
            }
            Err(e) => NativeOutcome::Failed(e.to_string()),
        }
    }

    /// Render every page and OCR it. Failures here are final.
    fn ocr_pdf(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
        self.capabilities.ensure(OcrNeed::ScannedPdf)?;

        let images = self
            .pdf_renderer
            .render_pages(pdf_bytes, self.config.render_dpi)?;

        let mut pages = Vec::with_capacity(images.len());
        for (idx, image) in images.iter().enumerate() {
            let prepared = prepare_for_ocr(image)?;
            let text = self
                .ocr_engine
                .recognize(&prepared)
                .map_err(|e| rescope_unavailable(e, OcrNeed::ScannedPdf))?;
            tracing::debug!(page = idx + 1, chars = text.len(), "PDF page OCR complete");
            pages.push(PageText {
                page_number: idx + 1,
                text,
            });
        }

        let chars: usize = pages.iter().map(|p| content_chars(&p.text)).sum();
        self.check_ocr_quality(chars)?;
        Ok(pages)
    }

    /// OCR availability for images is checked by the caller before dispatch.
    fn extract_image(&self, image_bytes: &[u8]) -> Result<RawExtraction, ExtractionError> {
        let prepared = prepare_for_ocr(image_bytes)?;
        let text = self.ocr_engine.recognize(&prepared)?;
        self.check_ocr_quality(content_chars(&text))?;

        Ok(RawExtraction {
            method: ExtractionMethod::ImageOcr,
            text,
            page_count: 1,
            notes: vec![DiagnosticNote::OcrUsed { pages: 1 }],
        })
    }

    /// OCR that ran but found (almost) nothing is a hard failure.
    fn check_ocr_quality(&self, chars: usize) -> Result<(), ExtractionError> {
        if chars < self.config.min_text_chars {
            tracing::warn!(
                chars,
                minimum = self.config.min_text_chars,
                "OCR output below usefulness threshold"
            );
            return Err(ExtractionError::ExtractionQuality {
                chars,
                minimum: self.config.min_text_chars,
            });
        }
        Ok(())
    }
}

/// Non-whitespace character count.
pub fn content_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

fn rescope_unavailable(err: ExtractionError, need: OcrNeed) -> ExtractionError {
    match err {
        ExtractionError::OcrUnavailable { hint, .. } => ExtractionError::OcrUnavailable { need, hint },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::ocr::MockOcrEngine;
    use crate::pipeline::extraction::pdf::MockPdfExtractor;
    use crate::pipeline::extraction::pdf_renderer::MockPdfPageRenderer;

    fn extractor(
        caps: OcrCapabilities,
        ocr_text: &str,
        pdf: MockPdfExtractor,
        rendered_pages: usize,
    ) -> DocumentExtractor {
        DocumentExtractor::new(
            ParserConfig::default(),
            caps,
            Box::new(MockOcrEngine::new(ocr_text)),
            Box::new(pdf),
            Box::new(MockPdfPageRenderer {
                pages: rendered_pages,
            }),
        )
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(32, 32, image::Rgb([100u8, 150, 200]));
        crate::pipeline::extraction::encode_png(&image::DynamicImage::ImageRgb8(img)).unwrap()
    }

    #[test]
    fn digital_pdf_uses_native_text_with_page_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.pdf", b"%PDF-1.4");
        let ex = extractor(
            OcrCapabilities::unavailable(),
            "unused",
            MockPdfExtractor::with_pages(&["Glucose: 95 mg/dL", "HDL: 55 mg/dL"]),
            0,
        );

        let result = ex.extract(&path, FormatKind::Pdf).unwrap();
        assert_eq!(result.method, ExtractionMethod::PdfDirect);
        assert_eq!(result.page_count, 2);
        assert!(result.text.starts_with("--- Page 1 ---\nGlucose"));
        assert!(result.text.contains("--- Page 2 ---\nHDL"));
        assert!(!result
            .notes
            .iter()
            .any(|n| matches!(n, DiagnosticNote::OcrUsed { .. })));
    }

    #[test]
    fn empty_text_layer_falls_back_to_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "scan.pdf", b"%PDF-1.4");
        let ex = extractor(
            OcrCapabilities::available(),
            "Hemoglobin: 13.5 g/dL",
            MockPdfExtractor::with_pages(&["", "  "]),
            2,
        );

        let result = ex.extract(&path, FormatKind::Pdf).unwrap();
        assert_eq!(result.method, ExtractionMethod::PdfOcrFallback);
        assert_eq!(result.page_count, 2);
        assert!(result.text.contains("--- Page 2 ---\nHemoglobin: 13.5 g/dL"));
        assert!(result
            .notes
            .contains(&DiagnosticNote::NativePdfInsufficient { chars: 0 }));
        assert!(result.notes.contains(&DiagnosticNote::OcrUsed { pages: 2 }));
    }

    #[test]
    fn unreadable_text_layer_falls_back_to_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "broken.pdf", b"garbage");
        let ex = extractor(
            OcrCapabilities::available(),
            "Creatinine: 0.9 mg/dL",
            MockPdfExtractor::failing("xref table missing"),
            1,
        );

        let result = ex.extract(&path, FormatKind::Pdf).unwrap();
        assert_eq!(result.method, ExtractionMethod::PdfOcrFallback);
        assert!(result.notes.iter().any(|n| matches!(
            n,
            DiagnosticNote::NativePdfFailed { reason } if reason.contains("xref")
        )));
    }

    #[test]
    fn scanned_pdf_without_ocr_reports_distinctly() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "scan.pdf", b"%PDF-1.4");
        let ex = extractor(
            OcrCapabilities::unavailable(),
            "unused",
            MockPdfExtractor::with_pages(&[""]),
            1,
        );

        let err = ex.extract(&path, FormatKind::Pdf).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::OcrUnavailable {
                need: OcrNeed::ScannedPdf,
                ..
            }
        ));
        assert!(err.to_string().contains("scanned"));
    }

    #[test]
    fn pdf_ocr_with_no_text_is_quality_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "blank.pdf", b"%PDF-1.4");
        let ex = extractor(
            OcrCapabilities::available(),
            "  ~ ",
            MockPdfExtractor::with_pages(&[""]),
            1,
        );

        let err = ex.extract(&path, FormatKind::Pdf).unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionQuality { .. }));
    }

    #[test]
    fn partially_empty_ocr_pages_are_noted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "scan.pdf", b"%PDF-1.4");

        struct AlternatingOcr(std::sync::atomic::AtomicUsize);
        impl OcrEngine for AlternatingOcr {
            fn recognize(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
                let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(if n % 2 == 0 {
                    "Platelets: 250 K/uL".to_string()
                } else {
                    String::new()
                })
            }
        }

        let ex = DocumentExtractor::new(
            ParserConfig::default(),
            OcrCapabilities::available(),
            Box::new(AlternatingOcr(std::sync::atomic::AtomicUsize::new(0))),
            Box::new(MockPdfExtractor::with_pages(&[""])),
            Box::new(MockPdfPageRenderer { pages: 2 }),
        );

        let result = ex.extract(&path, FormatKind::Pdf).unwrap();
        assert!(result
            .notes
            .contains(&DiagnosticNote::EmptyOcrPages { pages: vec![2] }));
    }

    #[test]
    fn image_is_ocrd_after_grayscale() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "scan.png", &png_bytes());
        let ex = extractor(
            OcrCapabilities::available(),
            "Metformin 500 mg twice daily",
            MockPdfExtractor::with_pages(&[]),
            0,
        );

        let result = ex.extract(&path, FormatKind::Image).unwrap();
        assert_eq!(result.method, ExtractionMethod::ImageOcr);
        assert_eq!(result.text, "Metformin 500 mg twice daily");
        assert!(result.notes.contains(&DiagnosticNote::OcrUsed { pages: 1 }));
    }

    #[test]
    fn image_with_too_little_text_is_quality_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "blur.jpg", &png_bytes());
        let ex = extractor(
            OcrCapabilities::available(),
            "a b",
            MockPdfExtractor::with_pages(&[]),
            0,
        );

        match ex.extract(&path, FormatKind::Image) {
            Err(ExtractionError::ExtractionQuality { chars, minimum }) => {
                assert_eq!(chars, 2);
                assert_eq!(minimum, 10);
            }
            other => panic!("Expected ExtractionQuality, got {other:?}"),
        }
    }

    #[test]
    fn short_text_gets_diagnostic_note() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "note.txt", b"Glucose: 95 mg/dL");
        let ex = extractor(
            OcrCapabilities::unavailable(),
            "unused",
            MockPdfExtractor::with_pages(&[]),
            0,
        );

        let result = ex.extract(&path, FormatKind::Text).unwrap();
        assert_eq!(result.method, ExtractionMethod::PlainTextRead);
        assert_eq!(result.text, "Glucose: 95 mg/dL");
        assert!(result
            .notes
            .iter()
            .any(|n| matches!(n, DiagnosticNote::ShortText { .. })));
    }

    #[test]
    fn content_chars_ignores_whitespace() {
        assert_eq!(content_chars(" a b\n\tc "), 3);
        assert_eq!(content_chars(""), 0);
    }
}
