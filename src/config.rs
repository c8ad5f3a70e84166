//! Parser configuration.
//!
//! Every tunable threshold of the parsing pipeline lives here so hosts can
//! adjust them without touching extraction code. The core never reads
//! environment variables; the embedding application decides where a
//! `ParserConfig` comes from (defaults, a JSON file, its own settings store).

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Library-level constants
pub const APP_NAME: &str = "Healthdoc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter for hosts that install a subscriber.
pub fn default_log_filter() -> &'static str {
    "healthdoc=info"
}

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Thresholds and external tool settings used by `DocumentParser`.
///
/// Missing keys in a JSON file take the default value, so a config file
/// only needs to mention what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Below this many non-whitespace characters, extracted text is useless:
    /// OCR output fails with a quality error and native PDF text triggers
    /// the OCR fallback.
    pub min_text_chars: usize,
    /// Successful extractions shorter than this get a diagnostic note.
    pub short_text_chars: usize,
    /// Maximum characters kept per document section (marker included).
    pub section_max_chars: usize,
    /// Tesseract `--psm` value. 6 = single uniform block, suited to
    /// lab reports and letters.
    pub ocr_page_segmentation_mode: u8,
    /// Tesseract `-l` value.
    pub ocr_language: String,
    /// Restrict OCR output to alphanumerics plus `.,:-/()%`.
    pub ocr_restrict_charset: bool,
    /// Rasterization resolution for scanned PDF pages.
    pub render_dpi: u32,
    pub tesseract_binary: String,
    pub pdftoppm_binary: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 10,
            short_text_chars: 100,
            section_max_chars: 1000,
            ocr_page_segmentation_mode: 6,
            ocr_language: "eng".into(),
            ocr_restrict_charset: true,
            render_dpi: 300,
            tesseract_binary: "tesseract".into(),
            pdftoppm_binary: "pdftoppm".into(),
        }
    }
}

impl ParserConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), ?config, "Parser config loaded");
        Ok(config)
    }

    pub fn with_min_text_chars(mut self, chars: usize) -> Self {
        self.min_text_chars = chars;
        self
    }

    pub fn with_section_max_chars(mut self, chars: usize) -> Self {
        self.section_max_chars = chars;
        self
    }

    /// Set OCR language(s), e.g. "eng" or "eng+fra".
    pub fn with_ocr_language(mut self, langs: &str) -> Self {
        self.ocr_language = langs.to_string();
        self
    }

    pub fn with_render_dpi(mut self, dpi: u32) -> Self {
        self.render_dpi = dpi;
        self
    }
}
