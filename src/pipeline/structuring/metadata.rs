//! Labeled-field metadata: dates, report date, patient and doctor names,
//! medical record number.
//!
//! Runs over line-preserving cleaned text so a name stops at its line end.

use std::sync::LazyLock;

use regex::Regex;

use super::types::DocumentMetadata;

const DATE: &str = r"\d{4}-\d{2}-\d{2}|\d{1,2}[-/]\d{1,2}[-/]\d{2,4}";

/// Up to three name words on one line.
const NAME: &str = r"[A-Za-z][A-Za-z.\-]*(?:[ \t]+[A-Za-z][A-Za-z.\-]*){0,2}";

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b(?:{DATE})\b")).unwrap());

static REPORT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:Report|Test|Lab|Collection)\s+Date\s*:\s*({DATE})\b"
    ))
    .unwrap()
});

static PATIENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bPatient(?:[ \t]+Name)?[ \t]*:[ \t]*({NAME})")).unwrap()
});

static DOCTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:Doctor|Physician)[ \t]*:[ \t]*(?:Dr\.?[ \t]+)?({NAME})"
    ))
    .unwrap()
});

/// Title form: "Dr. Smith" at line start, after a label colon, or after "by".
/// A street suffix ("12 Oak Dr. Springfield") has none of these before it.
static DR_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?:^[ \t]*|:[ \t]*|\b(?i:by)[ \t]+)Dr\b\.?[ \t]*:?[ \t]*([A-Z][A-Za-z.\-]*(?:[ \t]+[A-Z][A-Za-z.\-]*){0,2})",
    )
    .unwrap()
});

/// "MRN" and "MR" are case-sensitive; the bare "MR" needs `:` or `#` so the
/// honorific "Mr" never matches.
static MRN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:MRN(?:[ \t]*(?i:No\.?|Number))?[ \t]*[:#]?|MR[ \t]*[:#]|(?i:Medical[ \t]+Record)(?:[ \t]*(?i:No\.?|Number))?[ \t]*[:#]?)[ \t]*(\d(?:[\d-]*\d)?)",
    )
    .unwrap()
});

/// Words that start the next field on the same line, not part of a name.
const NAME_STOP_WORDS: &[&str] = &[
    "dob", "mrn", "mr", "date", "age", "sex", "gender", "id", "dr", "dr.", "doctor", "physician",
];

/// Extract document-level fields. Absent fields stay `None`.
pub fn extract_metadata(text: &str) -> DocumentMetadata {
    let dates: Vec<String> = DATE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();

    let report_date = REPORT_DATE_RE
        .captures(text)
        .map(|c| c[1].to_string());

    DocumentMetadata {
        dates,
        report_date,
        patient_name: capture_name(&PATIENT_RE, text),
        doctor_name: capture_name(&DOCTOR_RE, text)
            .or_else(|| capture_name(&DR_TITLE_RE, text)),
        medical_record_number: MRN_RE.captures(text).map(|c| c[1].to_string()),
    }
}

fn capture_name(pattern: &Regex, text: &str) -> Option<String> {
    let group = pattern.captures(text)?.get(1)?;
    let mut words: Vec<&str> = group.as_str().split_whitespace().collect();

    if let Some(stop) = words
        .iter()
        .position(|w| NAME_STOP_WORDS.contains(&w.to_lowercase().as_str()))
    {
        words.truncate(stop);
    }

    // "Jane Doe Age: 54" captures "Age" as a third word
    let label_follows = text[group.end()..]
        .trim_start_matches([' ', '\t'])
        .starts_with(':');
    if label_follows && words.len() == group.as_str().split_whitespace().count() {
        words.pop();
    }

    let name = words.join(" ").trim_end_matches(['.', '-']).to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_all_dates_in_order() {
        let meta = extract_metadata("Visit 03/15/2024\nFollow-up 2024-04-02\nPrior 1-5-23");
        assert_eq!(meta.dates, vec!["03/15/2024", "2024-04-02", "1-5-23"]);
    }

    #[test]
    fn report_date_is_first_labeled_date() {
        let text = "Printed 01/01/2024\nReport Date: 03/15/2024\nTest Date: 03/10/2024";
        let meta = extract_metadata(text);
        assert_eq!(meta.report_date.as_deref(), Some("03/15/2024"));
        assert_eq!(meta.dates.len(), 3);
    }

    #[test]
    fn blood_pressure_is_not_a_date() {
        let meta = extract_metadata("BP: 120/80 mmHg");
        assert!(meta.dates.is_empty());
    }

    #[test]
    fn patient_name_stops_at_line_end() {
        let meta = extract_metadata("Patient: Jane Doe\nGlucose | 95 mg/dL");
        assert_eq!(meta.patient_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn patient_name_label_variants() {
        let meta = extract_metadata("PATIENT NAME: John Q Public");
        assert_eq!(meta.patient_name.as_deref(), Some("John Q Public"));
    }

    #[test]
    fn patient_name_stops_before_next_field() {
        let meta = extract_metadata("Patient: Jane Doe DOB: 01/02/1970");
        assert_eq!(meta.patient_name.as_deref(), Some("Jane Doe"));

        let meta = extract_metadata("Patient: Jane Doe Ward: 4");
        assert_eq!(meta.patient_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn doctor_name_from_each_label() {
        assert_eq!(
            extract_metadata("Dr. Smith").doctor_name.as_deref(),
            Some("Smith")
        );
        assert_eq!(
            extract_metadata("Physician: Dr. Emily Chen").doctor_name.as_deref(),
            Some("Emily Chen")
        );
        assert_eq!(
            extract_metadata("Doctor: Alan Grant, MD").doctor_name.as_deref(),
            Some("Alan Grant")
        );
    }

    #[test]
    fn doctor_title_in_running_text() {
        assert_eq!(
            extract_metadata("Seen by Dr. Patel today").doctor_name.as_deref(),
            Some("Patel")
        );
    }

    #[test]
    fn street_address_is_not_a_doctor() {
        let meta = extract_metadata("Address: 12 Oak Dr. Springfield\nPatient: Jane Doe");
        assert_eq!(meta.doctor_name, None);
        assert_eq!(meta.patient_name.as_deref(), Some("Jane Doe"));

        assert_eq!(extract_metadata("12 oak dr. springfield").doctor_name, None);
    }

    #[test]
    fn honorific_mr_is_not_a_record_number() {
        assert_eq!(
            extract_metadata("Seen by Mr 45 year old").medical_record_number,
            None
        );
        assert_eq!(extract_metadata("MR 45").medical_record_number, None);
        assert_eq!(
            extract_metadata("MR# 7788").medical_record_number.as_deref(),
            Some("7788")
        );
    }

    #[test]
    fn medical_record_number_variants() {
        assert_eq!(
            extract_metadata("MRN: 12345").medical_record_number.as_deref(),
            Some("12345")
        );
        assert_eq!(
            extract_metadata("Medical Record Number: 884-221").medical_record_number.as_deref(),
            Some("884-221")
        );
    }

    #[test]
    fn absent_fields_are_none() {
        let meta = extract_metadata("Glucose: 95 mg/dL");
        assert!(meta.is_empty());
        assert_eq!(extract_metadata(""), DocumentMetadata::default());
    }
}
