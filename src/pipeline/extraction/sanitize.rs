use std::sync::LazyLock;

use regex::Regex;

/// Fixed OCR confusion corrections, applied in order.
static OCR_CORRECTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // isolated lowercase L read instead of 1
        (Regex::new(r"\bl\b").unwrap(), "1"),
        // isolated uppercase O read instead of 0
        (Regex::new(r"\bO\b").unwrap(), "0"),
        // token-initial "l/" as in "l/2 tablet"; leaves "mmol/L" alone
        (Regex::new(r"\bl/").unwrap(), "1/"),
    ]
});

/// Characters kept besides alphanumerics and whitespace.
/// `|` is the table-cell delimiter produced by the DOCX reader.
fn is_medical_punctuation(c: char) -> bool {
    matches!(
        c,
        '-' | '.' | ',' | '/' | ':' | ';' | '(' | ')' | '%' | '°' | '|'
    )
}

fn strip_disallowed(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || is_medical_punctuation(c) {
                c
            } else {
                ' '
            }
        })
        .collect()
}

fn apply_ocr_corrections(text: &str) -> String {
    OCR_CORRECTIONS
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

/// Normalize extracted text into a single line.
///
/// Disallowed characters become spaces, whitespace runs (newlines included)
/// collapse to one space, OCR confusions are corrected and the result is
/// trimmed. `clean_text(clean_text(x)) == clean_text(x)`.
pub fn clean_text(raw: &str) -> String {
    let stripped = strip_disallowed(raw);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    apply_ocr_corrections(&collapsed)
}

/// Same rules as `clean_text`, applied per line.
///
/// Line breaks survive; runs of blank lines collapse to one blank line and
/// leading/trailing blank lines are dropped. Label-shaped fields (names,
/// record numbers) and section boundaries are read from this form.
pub fn clean_lines(raw: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut pending_blank = false;

    for line in raw.lines() {
        let cleaned = clean_text(line);
        if cleaned.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push(String::new());
            pending_blank = false;
        }
        out.push(cleaned);
    }

    out.join("\n")
}
