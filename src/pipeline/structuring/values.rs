//! Medical value extraction: an ordered table of label → value rules.
//!
//! Rules run in table order. A match is kept only if its span does not
//! overlap a span already claimed by an earlier rule, so "LDL Cholesterol"
//! owns "LDL Cholesterol: 130" before the generic cholesterol rule can see
//! it. Output is sorted by position in the text.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::types::MetricCategory::{
    Cardiovascular, Hematology, Hepatic, Inflammation, Metabolic, Renal, Thyroid, Vitals, Vitamins,
};
use super::types::{ExtractedValue, MetricCategory};

/// Shape of the value a rule captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Single number: "13.5", "250,000".
    Scalar,
    /// Compound "systolic/diastolic": "120/80". Kept as one string.
    Ratio,
}

/// One entry of the prioritized rule table.
#[derive(Debug)]
pub struct ValueRule {
    /// Table position; lower runs first.
    pub priority: usize,
    pub canonical_name: &'static str,
    pub category: MetricCategory,
    pub kind: RuleKind,
    pattern: Regex,
}

const SCALAR_VALUE: &str = r"\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?";
const RATIO_VALUE: &str = r"\d{2,3}\s*/\s*\d{2,3}";
/// Label/value separator: colon, table-cell pipe, or bare whitespace.
const SEPARATOR: &str = r"\s*[:|]?\s*";

struct RuleDef {
    name: &'static str,
    category: MetricCategory,
    kind: RuleKind,
    labels: &'static str,
    units: &'static [&'static str],
}

const fn scalar(
    name: &'static str,
    category: MetricCategory,
    labels: &'static str,
    units: &'static [&'static str],
) -> RuleDef {
    RuleDef {
        name,
        category,
        kind: RuleKind::Scalar,
        labels,
        units,
    }
}

const MG_DL: &[&str] = &["mg/dL", "mmol/L"];
const CELLS: &[&str] = &["K/uL", "K/µL", "x10 3/uL", "10 3/uL", "cells/uL", "K"];

/// Specific labels precede the generic ones they contain.
/// Abbreviations are matched case-sensitively via `(?-i:...)`.
const RULE_TABLE: &[RuleDef] = &[
    // Lipid panel
    scalar("Non-HDL Cholesterol", Cardiovascular, r"Non-HDL(?:\s*C(?:holesterol)?)?", MG_DL),
    scalar(
        "LDL Cholesterol",
        Cardiovascular,
        r"LDL(?:[\s-]*C(?:holesterol)?)?|Low\s+Density\s+Lipoprotein",
        MG_DL,
    ),
    scalar(
        "HDL Cholesterol",
        Cardiovascular,
        r"HDL(?:[\s-]*C(?:holesterol)?)?|High\s+Density\s+Lipoprotein",
        MG_DL,
    ),
    scalar(
        "Total Cholesterol",
        Cardiovascular,
        r"Cholesterol,?\s+Total|(?:Total\s+)?Cholesterol",
        MG_DL,
    ),
    scalar("Triglycerides", Cardiovascular, r"Triglycerides?|(?-i:TG|TRIG)", MG_DL),
    // Glucose and diabetes
    scalar(
        "HbA1c",
        Metabolic,
        r"HbA1c|Hb\s*A1c|Hgb\s*A1c|Hemoglobin\s*A1c|A1c|Glycated\s+Hemoglobin|Glycosylated\s+Hemoglobin",
        &["%", "mmol/mol"],
    ),
    scalar(
        "Glucose",
        Metabolic,
        r"Fasting\s+(?:Blood\s+)?Glucose|Blood\s+Glucose|Glucose|Blood\s+Sugar|(?-i:GLU|FBS)",
        MG_DL,
    ),
    scalar("Insulin", Metabolic, r"Insulin", &["uIU/mL", "µIU/mL", "pmol/L"]),
    // CBC
    scalar(
        "Hemoglobin",
        Hematology,
        r"Hemoglobin|Haemoglobin|(?-i:Hgb|HGB|Hb)",
        &["g/dL", "g/L"],
    ),
    scalar("Hematocrit", Hematology, r"Hematocrit|Haematocrit|(?-i:Hct|HCT)", &["%"]),
    scalar(
        "WBC",
        Hematology,
        r"White\s+Blood\s+Cells?(?:\s+Count)?|Leukocytes|(?-i:WBC)",
        CELLS,
    ),
    scalar(
        "RBC",
        Hematology,
        r"Red\s+Blood\s+Cells?(?:\s+Count)?|Erythrocytes|(?-i:RBC)",
        &["M/uL", "M/µL", "x10 6/uL", "10 6/uL"],
    ),
    scalar("Platelets", Hematology, r"Platelets?(?:\s+Count)?|(?-i:PLT)", CELLS),
    scalar("MCV", Hematology, r"Mean\s+Corpuscular\s+Volume|(?-i:MCV)", &["fL"]),
    scalar("Ferritin", Hematology, r"Ferritin", &["ng/mL", "ug/L", "µg/L"]),
    // Metabolic panel electrolytes
    scalar("Sodium", Metabolic, r"Sodium|(?-i:Na)", &["mEq/L", "mmol/L"]),
    scalar("Potassium", Metabolic, r"Potassium", &["mEq/L", "mmol/L"]),
    scalar("Chloride", Metabolic, r"Chloride|(?-i:Cl)", &["mEq/L", "mmol/L"]),
    scalar(
        "CO2",
        Metabolic,
        r"Carbon\s+Dioxide|Bicarbonate|(?-i:CO2|HCO3)",
        &["mEq/L", "mmol/L"],
    ),
    scalar("Calcium", Metabolic, r"Calcium|(?-i:Ca)", &["mg/dL", "mmol/L"]),
    // Kidney
    scalar(
        "BUN",
        Renal,
        r"Blood\s+Urea\s+Nitrogen|Urea\s+Nitrogen|(?-i:BUN)",
        MG_DL,
    ),
    scalar("Creatinine", Renal, r"Creatinine|(?-i:Creat|Cr)", &["mg/dL", "umol/L", "µmol/L"]),
    scalar(
        "eGFR",
        Renal,
        r"(?-i:eGFR|GFR)|Estimated\s+GFR",
        &["mL/min/1.73 m2", "mL/min/1.73m2", "mL/min/1.73m²", "mL/min"],
    ),
    scalar("Uric Acid", Renal, r"Uric\s+Acid", MG_DL),
    // Liver
    scalar(
        "ALT",
        Hepatic,
        r"Alanine\s+(?:Aminotransferase|Transaminase)|(?-i:ALT|SGPT)",
        &["U/L", "IU/L"],
    ),
    scalar(
        "AST",
        Hepatic,
        r"Aspartate\s+(?:Aminotransferase|Transaminase)|(?-i:AST|SGOT)",
        &["U/L", "IU/L"],
    ),
    scalar(
        "Alkaline Phosphatase",
        Hepatic,
        r"Alkaline\s+Phosphatase|(?-i:ALP|ALK\s+PHOS)",
        &["U/L", "IU/L"],
    ),
    scalar(
        "Bilirubin",
        Hepatic,
        r"(?:Total\s+)?Bilirubin|(?-i:TBIL)",
        &["mg/dL", "umol/L", "µmol/L"],
    ),
    scalar("Albumin", Hepatic, r"Albumin|(?-i:ALB)", &["g/dL", "g/L"]),
    // Thyroid
    scalar(
        "TSH",
        Thyroid,
        r"Thyroid\s+Stimulating\s+Hormone|(?-i:TSH)",
        &["mIU/L", "uIU/mL", "µIU/mL"],
    ),
    scalar("Free T4", Thyroid, r"Free\s+T4|Free\s+Thyroxine|(?-i:FT4)", &["ng/dL", "pmol/L"]),
    scalar("T3", Thyroid, r"(?:Free|Total)\s+T3|(?-i:FT3|T3)", &["pg/mL", "ng/dL", "pmol/L"]),
    // Inflammation
    scalar(
        "CRP",
        Inflammation,
        r"(?:hs-?|High\s+Sensitivity\s+)?CRP|C-Reactive\s+Protein",
        &["mg/L", "mg/dL"],
    ),
    scalar(
        "ESR",
        Inflammation,
        r"Sed(?:imentation)?\s+Rate|(?-i:ESR)",
        &["mm/hr", "mm/h"],
    ),
    // Vitamins
    scalar(
        "Vitamin D",
        Vitamins,
        r"Vitamin\s+D,?\s+25-(?:OH|Hydroxy)|25-(?:OH|Hydroxy)\s+Vitamin\s+D|Vitamin\s+D3?",
        &["ng/mL", "nmol/L"],
    ),
    scalar("Vitamin B12", Vitamins, r"Vitamin\s+B12|Cobalamin|(?-i:B12)", &["pg/mL", "pmol/L"]),
    // Vitals
    RuleDef {
        name: "Blood Pressure",
        category: Cardiovascular,
        kind: RuleKind::Ratio,
        labels: r"(?:Blood\s+)?Pressure|(?-i:BP)",
        units: &["mmHg", "mm Hg"],
    },
    scalar(
        "Heart Rate",
        Cardiovascular,
        r"Heart\s+Rate|Pulse(?:\s+Rate)?|(?-i:HR)",
        &["bpm", "beats/min"],
    ),
    scalar("BMI", Vitals, r"Body\s+Mass\s+Index|(?-i:BMI)", &["kg/m2", "kg/m²"]),
    scalar("Weight", Vitals, r"Weight|(?-i:Wt)", &["kg", "lbs", "lb", "pounds"]),
    scalar(
        "Temperature",
        Vitals,
        r"Temperature|(?-i:Temp)",
        &["°F", "°C", "degrees F", "degrees C", "F", "C"],
    ),
    scalar(
        "Oxygen Saturation",
        Vitals,
        r"Oxygen\s+Saturation|(?-i:SpO2|O2\s+Sat)",
        &["%"],
    ),
];

/// The compiled rule table, in priority order.
pub static VALUE_RULES: LazyLock<Vec<ValueRule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .enumerate()
        .map(|(priority, def)| ValueRule {
            priority,
            canonical_name: def.name,
            category: def.category,
            kind: def.kind,
            pattern: Regex::new(&rule_pattern(def)).unwrap(),
        })
        .collect()
});

/// Every rule label, anchored, for telling "Glucose:" from "Physical Exam:".
static VALUE_LABELS: LazyLock<Regex> = LazyLock::new(|| {
    let labels = RULE_TABLE
        .iter()
        .map(|def| def.labels)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)^(?:{labels})$")).unwrap()
});

/// Whether `label` names one of the measured values.
pub fn is_value_label(label: &str) -> bool {
    VALUE_LABELS.is_match(label.trim())
}

fn rule_pattern(def: &RuleDef) -> String {
    let value = match def.kind {
        RuleKind::Scalar => SCALAR_VALUE,
        RuleKind::Ratio => RATIO_VALUE,
    };
    let units = def
        .units
        .iter()
        .map(|u| {
            let escaped = regex::escape(u).replace(' ', r"\s*");
            // word-final units must not run into a following word
            if u.ends_with(|c: char| c.is_ascii_alphanumeric()) {
                format!(r"{escaped}\b")
            } else {
                escaped
            }
        })
        .collect::<Vec<_>>()
        .join("|");

    format!(
        r"(?i)\b(?:{labels})\b{SEPARATOR}(?P<value>{value})(?:\s*(?P<unit>{units}))?",
        labels = def.labels,
    )
}

fn overlaps(claimed: &[Range<usize>], span: &Range<usize>) -> bool {
    claimed
        .iter()
        .any(|c| c.start < span.end && span.start < c.end)
}

/// Extract every medical value in `text`, ordered by position.
pub fn extract_medical_values(text: &str) -> Vec<ExtractedValue> {
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut found: Vec<(usize, ExtractedValue)> = Vec::new();

    for rule in VALUE_RULES.iter() {
        for caps in rule.pattern.captures_iter(text) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.name("value")) else {
                continue;
            };
            let span = whole.range();
            if overlaps(&claimed, &span) {
                tracing::trace!(rule = rule.canonical_name, start = span.start, "span already claimed");
                continue;
            }
            claimed.push(span.clone());

            let value = match rule.kind {
                RuleKind::Scalar => value.as_str().to_string(),
                RuleKind::Ratio => value.as_str().split_whitespace().collect(),
            };
            found.push((
                rule.priority,
                ExtractedValue {
                    test_name: rule.canonical_name.to_string(),
                    value,
                    unit: caps.name("unit").map(|u| u.as_str().to_string()),
                    position: span.start,
                },
            ));
        }
    }

    found.sort_by_key(|(priority, v)| (v.position, *priority));
    tracing::debug!(count = found.len(), "Medical values extracted");
    found.into_iter().map(|(_, v)| v).collect()
}

/// Category of a canonical test name, if it is one of ours.
pub fn category_of(test_name: &str) -> Option<MetricCategory> {
    VALUE_RULES
        .iter()
        .find(|r| r.canonical_name == test_name)
        .map(|r| r.category)
}

/// Group values by body system. Categories with no values are absent.
pub fn categorize_values(values: &[ExtractedValue]) -> BTreeMap<MetricCategory, Vec<ExtractedValue>> {
    let mut grouped: BTreeMap<MetricCategory, Vec<ExtractedValue>> = BTreeMap::new();
    for v in values {
        if let Some(category) = category_of(&v.test_name) {
            grouped.entry(category).or_default().push(v.clone());
        }
    }
    grouped
}
