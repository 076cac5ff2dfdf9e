//! Static code tables.
//!
//! All tables are compile-time arrays and are never mutated, so lookups are safe from any
//! thread. Codes are matched case-sensitively against the canonical upper-case form used by
//! the lab feed.

use serde::Serialize;

/// Catalogue entry for an orderable test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TestInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub loinc: &'static str,
}

/// Bounds outside of which a numeric result is life-threatening.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CriticalThreshold {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub unit: &'static str,
}

impl CriticalThreshold {
    /// True when `value` lies strictly below `low` or strictly above `high`.
    pub fn is_violated_by(&self, value: f64) -> bool {
        self.low.is_some_and(|low| value < low) || self.high.is_some_and(|high| value > high)
    }
}

const fn info(
    code: &'static str,
    name: &'static str,
    category: &'static str,
    loinc: &'static str,
) -> TestInfo {
    TestInfo {
        code,
        name,
        category,
        loinc,
    }
}

static TEST_CATALOGUE: &[TestInfo] = &[
    info("HGB", "Hemoglobin", "hematology", "718-7"),
    info("HCT", "Hematocrit", "hematology", "4544-3"),
    info("WBC", "White Blood Cell Count", "hematology", "6690-2"),
    info("PLT", "Platelet Count", "hematology", "777-3"),
    info("K", "Potassium", "chemistry", "2823-3"),
    info("NA", "Sodium", "chemistry", "2951-2"),
    info("CL", "Chloride", "chemistry", "2075-0"),
    info("CO2", "Bicarbonate", "chemistry", "2028-9"),
    info("BUN", "Blood Urea Nitrogen", "chemistry", "3094-0"),
    info("CREAT", "Creatinine", "chemistry", "2160-0"),
    info("GLU", "Glucose", "chemistry", "2345-7"),
    info("CA", "Calcium", "chemistry", "17861-6"),
    info("PHOS", "Phosphorus", "chemistry", "2777-1"),
    info("MG", "Magnesium", "chemistry", "19123-9"),
    info("ALB", "Albumin", "chemistry", "1751-7"),
    info("PTH", "Parathyroid Hormone, Intact", "endocrine", "2731-8"),
    info("FERR", "Ferritin", "iron_studies", "2276-4"),
    info("TSAT", "Transferrin Saturation", "iron_studies", "2502-3"),
    info("IRON", "Iron", "iron_studies", "2498-4"),
];

static CRITICAL_THRESHOLDS: &[(&str, CriticalThreshold)] = &[
    ("K", CriticalThreshold { low: Some(2.5), high: Some(6.5), unit: "mmol/L" }),
    ("NA", CriticalThreshold { low: Some(120.0), high: Some(160.0), unit: "mmol/L" }),
    ("GLU", CriticalThreshold { low: Some(40.0), high: Some(500.0), unit: "mg/dL" }),
    ("CA", CriticalThreshold { low: Some(6.0), high: Some(13.0), unit: "mg/dL" }),
    ("HGB", CriticalThreshold { low: Some(7.0), high: Some(20.0), unit: "g/dL" }),
    ("PLT", CriticalThreshold { low: Some(20.0), high: Some(1000.0), unit: "10^3/uL" }),
    ("MG", CriticalThreshold { low: Some(1.0), high: Some(4.9), unit: "mg/dL" }),
    ("PHOS", CriticalThreshold { low: Some(1.0), high: None, unit: "mg/dL" }),
    ("CO2", CriticalThreshold { low: Some(10.0), high: Some(40.0), unit: "mmol/L" }),
];

// Only clinically modelled fields are persisted; anything missing here is dropped.
static INTERNAL_FIELDS: &[(&str, &str)] = &[
    ("HGB", "hemoglobin"),
    ("HCT", "hematocrit"),
    ("K", "potassium"),
    ("NA", "sodium"),
    ("CL", "chloride"),
    ("CO2", "bicarbonate"),
    ("BUN", "bun"),
    ("CREAT", "creatinine"),
    ("GLU", "glucose"),
    ("CA", "calcium"),
    ("PHOS", "phosphorus"),
    ("MG", "magnesium"),
    ("ALB", "albumin"),
    ("PTH", "pth"),
    ("FERR", "ferritin"),
    ("TSAT", "tsat"),
    ("IRON", "iron"),
];

/// Looks up catalogue metadata (name, category, LOINC) for a test code.
pub fn test_info(code: &str) -> Option<&'static TestInfo> {
    TEST_CATALOGUE.iter().find(|t| t.code == code)
}

/// Looks up the critical-value threshold for a test code.
///
/// Most analytes have no threshold; `None` is not an error.
pub fn critical_threshold(code: &str) -> Option<&'static CriticalThreshold> {
    CRITICAL_THRESHOLDS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, threshold)| threshold)
}

/// Maps a test code to the field name used by the internal record store.
pub fn internal_field(code: &str) -> Option<&'static str> {
    INTERNAL_FIELDS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, field)| *field)
}

/// The full catalogue, in display order.
pub fn catalogue() -> &'static [TestInfo] {
    TEST_CATALOGUE
}
