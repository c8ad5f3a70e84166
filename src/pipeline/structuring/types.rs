use std::fmt;

use serde::{Deserialize, Serialize};

/// One matched medical measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedValue {
    /// Canonical display name ("LDL Cholesterol"), not the matched label.
    pub test_name: String,
    /// Matched value as text. Compound values ("120/80") stay whole.
    pub value: String,
    pub unit: Option<String>,
    /// Byte offset of the match in the cleaned text.
    #[serde(skip)]
    pub position: usize,
}

/// Document-level fields found by labeled-field patterns. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Every date token, in text order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_record_number: Option<String>,
}

impl DocumentMetadata {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A medication line found in document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// Body system a lab value or vital belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Cardiovascular,
    Metabolic,
    Hematology,
    Renal,
    Hepatic,
    Thyroid,
    Inflammation,
    Vitamins,
    Vitals,
}

impl MetricCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardiovascular => "cardiovascular",
            Self::Metabolic => "metabolic",
            Self::Hematology => "hematology",
            Self::Renal => "renal",
            Self::Hepatic => "hepatic",
            Self::Thyroid => "thyroid",
            Self::Inflammation => "inflammation",
            Self::Vitamins => "vitamins",
            Self::Vitals => "vitals",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
