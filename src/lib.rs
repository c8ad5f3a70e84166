//! Medical document parsing.
//!
//! Turns PDFs, images, DOCX and plain text files into cleaned text plus
//! structured fields: document metadata, lab values and vitals, and named
//! note sections. Text acquisition uses native readers first and falls back
//! to OCR for scanned PDFs; OCR availability is probed once and injected.

pub mod config;
pub mod pipeline;

pub use config::{ConfigError, ParserConfig};
pub use pipeline::extraction::{DiagnosticNote, ExtractionError, OcrCapabilities, OcrNeed};
pub use pipeline::import::FormatKind;
pub use pipeline::structuring::{DocumentMetadata, ExtractedValue, Medication, MetricCategory};
pub use pipeline::{DocumentParser, ParseResult, ProcessingError};
