use std::sync::LazyLock;

use regex::Regex;

use super::types::Medication;

/// Frequency used when a medication line names none.
pub const DEFAULT_FREQUENCY: &str = "As directed";

const NAME: &str = r"[A-Za-z][A-Za-z-]*(?:[ \t]+[A-Za-z][A-Za-z-]*)?";
const DOSE: &str = r"\d+(?:\.\d+)?[ \t]*(?:mg|mcg|g|mL|units?|IU)\b";
const FREQUENCY: &str = r"(?:once|twice|three[ \t]+times|four[ \t]+times)[ \t]+(?:a[ \t]+)?(?:daily|day)|every[ \t]+\d+[ \t]+hours?|daily|nightly|weekly|at[ \t]+bedtime|in[ \t]+the[ \t]+morning|as[ \t]+needed|BID|TID|QID|QHS|PRN";

/// "Metformin 500 mg twice daily", optionally with a few words before the
/// frequency ("by mouth daily").
static WITH_FREQUENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<name>{NAME})[ \t]+(?P<dose>{DOSE})[ \t]+(?P<freq>(?:[A-Za-z]+[ \t]+){{0,3}}?(?:{FREQUENCY}))\b"
    ))
    .unwrap()
});

/// "Aspirin - 81 mg"
static DASHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?P<name>{NAME})[ \t]+-[ \t]+(?P<dose>{DOSE})")).unwrap()
});

/// Leading instruction verbs captured as part of a two-word name.
const LEADING_VERBS: &[&str] = &["take", "takes", "start", "continue", "on", "stop"];

fn clean_name(raw: &str) -> Option<String> {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    if words.len() > 1 && LEADING_VERBS.contains(&words[0].to_lowercase().as_str()) {
        words.remove(0);
    }
    let name = words.join(" ");
    (!name.is_empty()).then_some(name)
}

/// Extract medication lines. Names are deduplicated case-insensitively,
/// first occurrence wins.
pub fn extract_medications(text: &str) -> Vec<Medication> {
    let mut medications: Vec<Medication> = Vec::new();

    for pattern in [&*WITH_FREQUENCY, &*DASHED] {
        for line in text.lines() {
            for caps in pattern.captures_iter(line) {
                let (Some(name), Some(dose)) = (caps.name("name"), caps.name("dose")) else {
                    continue;
                };
                let Some(name) = clean_name(name.as_str()) else {
                    continue;
                };
                if medications
                    .iter()
                    .any(|m| m.name.to_lowercase() == name.to_lowercase())
                {
                    continue;
                }
                medications.push(Medication {
                    name,
                    dosage: dose.as_str().trim().to_string(),
                    frequency: caps
                        .name("freq")
                        .map(|f| f.as_str().trim().to_string())
                        .unwrap_or_else(|| DEFAULT_FREQUENCY.to_string()),
                });
            }
        }
    }

    tracing::debug!(count = medications.len(), "Medications extracted");
    medications
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_dose_frequency_lines() {
        let meds = extract_medications(
            "Lisinopril 10 mg daily\nAtorvastatin 20 mg nightly\nMetformin 500 mg twice daily",
        );
        assert_eq!(meds.len(), 3);
        assert_eq!(
            meds[0],
            Medication {
                name: "Lisinopril".into(),
                dosage: "10 mg".into(),
                frequency: "daily".into(),
            }
        );
        assert_eq!(meds[1].frequency, "nightly");
        assert_eq!(meds[2].frequency, "twice daily");
    }

    #[test]
    fn dashed_line_defaults_frequency() {
        let meds = extract_medications("Aspirin - 81 mg");
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].name, "Aspirin");
        assert_eq!(meds[0].dosage, "81 mg");
        assert_eq!(meds[0].frequency, DEFAULT_FREQUENCY);
    }

    #[test]
    fn duplicates_are_dropped_case_insensitively() {
        let meds = extract_medications("Metformin 500 mg twice daily\nmetformin - 1000 mg");
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].dosage, "500 mg");
    }

    #[test]
    fn instruction_verb_is_not_part_of_name() {
        let meds = extract_medications("Take Metformin 500 mg BID");
        assert_eq!(meds[0].name, "Metformin");
        assert_eq!(meds[0].frequency, "BID");
    }

    #[test]
    fn two_word_names_and_unit_doses() {
        let meds = extract_medications("Insulin glargine 10 units at bedtime");
        assert_eq!(meds[0].name, "Insulin glargine");
        assert_eq!(meds[0].dosage, "10 units");
        assert_eq!(meds[0].frequency, "at bedtime");
    }

    #[test]
    fn words_before_frequency_are_kept() {
        let meds = extract_medications("Lisinopril 10 mg by mouth daily");
        assert_eq!(meds[0].frequency, "by mouth daily");
    }

    #[test]
    fn no_medications_in_lab_text() {
        assert!(extract_medications("Glucose: 95 mg/dL\nLDL: 100 mg/dL").is_empty());
    }
}
