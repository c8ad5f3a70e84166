//! Named document sections (chief complaint, history, plan, ...).
//!
//! Works on line-preserving cleaned text. A section starts at a header line
//! and runs until a blank line, the next header-looking line, or the end.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::values::is_value_label;

/// Marker appended to a section cut at the length limit.
pub const TRUNCATION_MARKER: &str = "...";

struct SectionPattern {
    name: &'static str,
    header: Regex,
}

const SECTION_HEADERS: &[(&str, &str)] = &[
    ("chief_complaint", r"Chief\s+Complaint|Reason\s+for\s+Visit|CC"),
    (
        "history",
        r"History\s+of\s+Present\s+Illness|Past\s+Medical\s+History|History|HPI|PMH",
    ),
    ("medications", r"Current\s+Medications?|Medications?|Meds"),
    ("allergies", r"Drug\s+Allergies|Allergies"),
    ("assessment", r"Assessment|Impression|Diagnosis"),
    ("plan", r"Treatment\s+Plan|Plan|Recommendations?"),
    ("lab_results", r"Lab(?:oratory)?\s+Results?"),
    ("vital_signs", r"Vital\s+Signs?|Vitals"),
];

static SECTION_PATTERNS: LazyLock<Vec<SectionPattern>> = LazyLock::new(|| {
    SECTION_HEADERS
        .iter()
        .map(|&(name, labels)| SectionPattern {
            name,
            // header label at line start, then a colon or nothing else
            header: Regex::new(&format!(r"(?i)^\s*(?:{labels})\s*(?::|$)")).unwrap(),
        })
        .collect()
});

/// "Physical Exam:" alone or followed by text. A digit after the colon
/// makes it a value line instead.
static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<label>[A-Z][A-Za-z /()&-]{1,40}):(?:$|[ \t]*[^\d\s])").unwrap()
});

/// Names of every section this extractor recognizes.
pub fn section_names() -> impl Iterator<Item = &'static str> {
    SECTION_HEADERS.iter().map(|(name, _)| *name)
}

fn is_all_caps_heading(line: &str) -> bool {
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    letters >= 4
        && !line.chars().any(|c| c.is_lowercase() || c.is_ascii_digit())
}

fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    SECTION_PATTERNS.iter().any(|s| s.header.is_match(trimmed))
        || LABEL_LINE
            .captures(trimmed)
            .is_some_and(|c| !is_value_label(&c["label"]))
        || is_all_caps_heading(trimmed)
}

/// Cut `content` to at most `max_chars` characters, marker included.
pub fn truncate_section(content: String, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content;
    }
    if max_chars <= TRUNCATION_MARKER.len() {
        return content.chars().take(max_chars).collect();
    }
    let keep = max_chars - TRUNCATION_MARKER.len();
    let mut cut: String = content.chars().take(keep).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

/// Extract recognized sections. Sections whose header never appears are
/// absent from the map; a header with no body maps to an empty string.
pub fn extract_sections(text: &str, max_chars: usize) -> BTreeMap<String, String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections = BTreeMap::new();

    for section in SECTION_PATTERNS.iter() {
        let Some((idx, header_end)) = lines
            .iter()
            .enumerate()
            .find_map(|(i, line)| section.header.find(line).map(|m| (i, m.end())))
        else {
            continue;
        };

        let mut body: Vec<&str> = Vec::new();
        let inline = lines[idx][header_end..].trim();
        if !inline.is_empty() {
            body.push(inline);
        }
        for line in &lines[idx + 1..] {
            if line.trim().is_empty() || is_header_line(line) {
                break;
            }
            body.push(line.trim());
        }

        sections.insert(
            section.name.to_string(),
            truncate_section(body.join("\n"), max_chars),
        );
    }

    tracing::debug!(count = sections.len(), "Sections extracted");
    sections
}
