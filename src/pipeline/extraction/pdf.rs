use super::types::{PageText, PdfExtractor};
use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
        let page_texts = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes).map_err(|e| {
            ExtractionError::FormatReader {
                format: "pdf",
                reason: e.to_string(),
            }
        })?;

        Ok(page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                page_number: i + 1,
                text,
            })
            .collect())
    }
}

/// Join pages as `--- Page N ---` blocks separated by blank lines.
pub fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|p| format!("--- Page {} ---\n{}", p.page_number, p.text.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Mock PDF extractor for testing
pub struct MockPdfExtractor {
    pub result: Result<Vec<PageText>, String>,
}

impl MockPdfExtractor {
    pub fn with_pages(texts: &[&str]) -> Self {
        Self {
            result: Ok(texts
                .iter()
                .enumerate()
                .map(|(i, t)| PageText {
                    page_number: i + 1,
                    text: t.to_string(),
                })
                .collect()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
        }
    }
}

impl PdfExtractor for MockPdfExtractor {
    fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
        self.result.clone().map_err(|reason| ExtractionError::FormatReader {
            format: "pdf",
            reason,
        })
    }
}
