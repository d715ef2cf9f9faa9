use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The canonical logical table a dataset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Patients,
    Activity,
}

const PATIENTS_REQUIRED_COLUMNS: &[&str] = &[
    "patient_number",
    "age",
    "bmi",
    "sex",
    "smoking",
    "chronic_kidney_disease",
    "adrenal_and_thyroid_disorders",
    "blood_pressure_abnormality",
    "level_of_stress",
];

const ACTIVITY_REQUIRED_COLUMNS: &[&str] = &["patient_number", "day_number", "physical_activity"];

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::Patients, TableKind::Activity];

    /// Name of the canonical table that SQL is written against.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            TableKind::Patients => "patients",
            TableKind::Activity => "activity",
        }
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::Patients => PATIENTS_REQUIRED_COLUMNS,
            TableKind::Activity => ACTIVITY_REQUIRED_COLUMNS,
        }
    }

    /// Required columns absent from `columns` (case-insensitive).
    pub fn missing_columns<S: AsRef<str>>(&self, columns: &[S]) -> Vec<&'static str> {
        self.required_columns()
            .iter()
            .filter(|req| !columns.iter().any(|c| c.as_ref().eq_ignore_ascii_case(req)))
            .copied()
            .collect()
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patients" | "patient" => Ok(TableKind::Patients),
            "activity" | "activities" => Ok(TableKind::Activity),
            other => Err(format!("Unknown table kind: {other}")),
        }
    }
}
