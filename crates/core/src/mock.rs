//! Deterministic provider responses for non-production environments.

use crate::constants::MOCK_RESULT_PREFIX;
use chrono::{TimeZone, Utc};
use hl7::oru::parse_reference_range;
use lab_types::{LabResult, LabTestResult, ResultFlag, ResultStatus, TestValue};

/// Patient id carried by every mock result.
pub const MOCK_PATIENT_ID: &str = "MOCK-PATIENT";

/// Performing lab reported on mock results.
pub const MOCK_PERFORMING_LAB: &str = "MOCK_LAB";

/// The fixed result returned for any order outside production.
///
/// Creatinine and potassium are flagged high by the "lab" but sit inside their critical
/// bounds, so the critical engine reports nothing for this result.
pub fn mock_result(order_id: &str) -> LabResult {
    LabResult {
        id: format!("{MOCK_RESULT_PREFIX}{order_id}"),
        order_id: Some(order_id.to_string()),
        patient_id: MOCK_PATIENT_ID.to_string(),
        patient_name: None,
        collection_date: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).single(),
        result_date: Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).single(),
        status: ResultStatus::Final,
        tests: vec![
            mock_test("HGB", "Hemoglobin", 12.5, "g/dL", "12.0-16.0", ResultFlag::Normal),
            mock_test("CREAT", "Creatinine", 4.5, "mg/dL", "0.6-1.2", ResultFlag::High),
            mock_test("K", "Potassium", 5.2, "mmol/L", "3.5-5.0", ResultFlag::High),
            mock_test("NA", "Sodium", 140.0, "mmol/L", "136-145", ResultFlag::Normal),
        ],
        performing_lab: Some(MOCK_PERFORMING_LAB.to_string()),
    }
}

fn mock_test(
    code: &str,
    name: &str,
    value: f64,
    unit: &str,
    range: &str,
    flag: ResultFlag,
) -> LabTestResult {
    let bounds = parse_reference_range(range);

    LabTestResult {
        code: code.to_string(),
        name: name.to_string(),
        value: TestValue::Numeric(value),
        unit: Some(unit.to_string()),
        reference_range: Some(range.to_string()),
        reference_range_low: bounds.map(|(low, _)| low),
        reference_range_high: bounds.map(|(_, high)| high),
        flag: Some(flag),
    }
}
