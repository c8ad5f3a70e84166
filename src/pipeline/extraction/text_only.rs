//! Plain text reading. UTF-8 only; decode failures are surfaced, never
//! replaced with empty output.

use super::ExtractionError;

/// Decode text file bytes as UTF-8. A leading byte-order mark is dropped.
pub fn read_plain_text(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    let text = String::from_utf8(bytes).map_err(|e| {
        ExtractionError::Encoding(format!(
            "file is not valid UTF-8 (invalid byte at offset {})",
            e.utf8_error().valid_up_to()
        ))
    })?;
    Ok(match text.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}
