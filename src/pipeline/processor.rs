//! Document parsing entry point.
//!
//! Drives the full pipeline for one file:
//! format dispatch → text acquisition → cleaning → {metadata, values, sections}.
//!
//! Uses trait-based DI for the OCR, PDF text and PDF rendering engines so the
//! parser is fully testable with mock implementations and a fixed
//! `OcrCapabilities` value.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::config::{ParserConfig, APP_NAME, APP_VERSION};
use crate::pipeline::extraction::{
    clean_lines, clean_text, DiagnosticNote, DocumentExtractor, ExtractionError,
    ExtractionMethod, OcrCapabilities, OcrEngine, OcrNeed, PdfExtractor, PdfPageRenderer,
    PdfTextExtractor, PdftoppmRenderer, TesseractCli,
};
use crate::pipeline::import::{detect_format, FormatKind};
use crate::pipeline::structuring::{
    categorize_values, extract_medical_values, extract_medications, extract_metadata,
    extract_sections, DocumentMetadata, ExtractedValue, Medication, MetricCategory,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from the async wrapper around a parse.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Parse task failed: {0}")]
    TaskJoin(String),
}

impl ProcessingError {
    pub fn remediation(&self) -> String {
        match self {
            Self::Extraction(e) => e.remediation(),
            Self::TaskJoin(_) => "The parse worker stopped unexpectedly; retry the document".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Everything extracted from one document.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub source_reference: PathBuf,
    pub format_kind: FormatKind,
    pub method: ExtractionMethod,
    pub page_count: usize,
    /// Extractor output, untouched (page markers and OCR noise included).
    pub raw_text: String,
    /// `clean_text(raw_text)`.
    pub cleaned_text: String,
    pub metadata: DocumentMetadata,
    /// In order of first occurrence in `cleaned_text`.
    pub extracted_values: Vec<ExtractedValue>,
    pub sections: BTreeMap<String, String>,
    pub diagnostic_notes: Vec<DiagnosticNote>,
}

impl ParseResult {
    /// Diagnostic notes as display strings.
    pub fn diagnostic_messages(&self) -> Vec<String> {
        self.diagnostic_notes.iter().map(|n| n.to_string()).collect()
    }

    pub fn values_by_category(&self) -> BTreeMap<MetricCategory, Vec<ExtractedValue>> {
        categorize_values(&self.extracted_values)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parses medical documents into `ParseResult`s.
///
/// Holds no mutable state; one instance can serve concurrent parses.
pub struct DocumentParser {
    extractor: DocumentExtractor,
}

impl DocumentParser {
    pub fn new(
        config: ParserConfig,
        capabilities: OcrCapabilities,
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
        pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
        pdf_renderer: Box<dyn PdfPageRenderer + Send + Sync>,
    ) -> Self {
        Self {
            extractor: DocumentExtractor::new(
                config,
                capabilities,
                ocr_engine,
                pdf_extractor,
                pdf_renderer,
            ),
        }
    }

    /// Parser backed by Tesseract, pdf-extract and pdftoppm. Probes the
    /// external binaries once.
    pub fn with_system_tools(config: ParserConfig) -> Self {
        tracing::info!("{} parser v{} starting", APP_NAME, APP_VERSION);
        let capabilities = OcrCapabilities::probe(&config);
        let ocr = TesseractCli::new(&config);
        let renderer = PdftoppmRenderer::new(&config);
        Self::new(
            config,
            capabilities,
            Box::new(ocr),
            Box::new(PdfTextExtractor),
            Box::new(renderer),
        )
    }

    pub fn config(&self) -> &ParserConfig {
        self.extractor.config()
    }

    pub fn capabilities(&self) -> OcrCapabilities {
        self.extractor.capabilities()
    }

    /// Parse one document.
    ///
    /// Fails with `UnsupportedFormat`, `SourceNotFound`, `OcrUnavailable`,
    /// `ExtractionQuality` or a reader error; everything after text
    /// acquisition degrades to empty output instead of failing.
    pub fn parse_document(&self, path: &Path) -> Result<ParseResult, ExtractionError> {
        let format_kind = detect_format(path)?;
        if !path.is_file() {
            return Err(ExtractionError::SourceNotFound(path.to_path_buf()));
        }
        if format_kind.requires_ocr() {
            self.capabilities().ensure(OcrNeed::Image)?;
        }

        tracing::info!(
            path = %path.display(),
            format = format_kind.as_str(),
            "Parsing document"
        );

        let raw = self.extractor.extract(path, format_kind)?;

        let cleaned_text = clean_text(&raw.text);
        let lines = clean_lines(&raw.text);
        let metadata = extract_metadata(&lines);
        let extracted_values = extract_medical_values(&cleaned_text);
        let sections = extract_sections(&lines, self.config().section_max_chars);

        tracing::info!(
            method = ?raw.method,
            pages = raw.page_count,
            chars = cleaned_text.len(),
            values = extracted_values.len(),
            sections = sections.len(),
            notes = raw.notes.len(),
            "Document parsed"
        );

        Ok(ParseResult {
            source_reference: path.to_path_buf(),
            format_kind,
            method: raw.method,
            page_count: raw.page_count,
            raw_text: raw.text,
            cleaned_text,
            metadata,
            extracted_values,
            sections,
            diagnostic_notes: raw.notes,
        })
    }

    /// Parse a document and pull medication lines out of its text.
    pub fn extract_medications_from_document(
        &self,
        path: &Path,
    ) -> Result<Vec<Medication>, ExtractionError> {
        let result = self.parse_document(path)?;
        Ok(extract_medications(&clean_lines(&result.raw_text)))
    }

    /// Run `parse_document` on the blocking thread pool.
    ///
    /// The parse itself cannot be interrupted; dropping the returned future
    /// only discards its result.
    pub async fn parse_document_blocking_task(
        self: Arc<Self>,
        path: PathBuf,
    ) -> Result<ParseResult, ProcessingError> {
        let result = tokio::task::spawn_blocking(move || self.parse_document(&path))
            .await
            .map_err(|e| ProcessingError::TaskJoin(e.to_string()))??;
        Ok(result)
    }
}
