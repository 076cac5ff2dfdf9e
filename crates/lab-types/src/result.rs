//! Lab results returned by a laboratory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Reporting status of a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Preliminary,
    Final,
    Corrected,
    Cancelled,
}

/// Clinical interpretation of a single analyte value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultFlag {
    Normal,
    Low,
    High,
    CriticalLow,
    CriticalHigh,
    Abnormal,
}

impl ResultFlag {
    /// Decodes an HL7 abnormal-flag code (OBX-8).
    ///
    /// Unrecognised codes, including the empty string, decode to [`ResultFlag::Normal`].
    pub fn from_hl7(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "H" => Self::High,
            "L" => Self::Low,
            "HH" | "CH" => Self::CriticalHigh,
            "LL" | "CL" => Self::CriticalLow,
            "A" => Self::Abnormal,
            _ => Self::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Low => "low",
            Self::High => "high",
            Self::CriticalLow => "critical_low",
            Self::CriticalHigh => "critical_high",
            Self::Abnormal => "abnormal",
        }
    }
}

/// A result value: numeric where the lab reported a number, otherwise the raw text.
///
/// Qualitative results such as `Positive` stay as [`TestValue::Text`]; consumers must handle
/// both cases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TestValue {
    Numeric(f64),
    Text(String),
}

impl TestValue {
    /// Interprets raw OBX-5 text.
    ///
    /// The value is numeric only when the whole trimmed token parses as a finite number.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Numeric(v),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for TestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for TestValue {
    fn from(v: f64) -> Self {
        Self::Numeric(v)
    }
}

/// One analyte result within a [`LabResult`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabTestResult {
    pub code: String,
    pub name: String,
    pub value: TestValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Reference range exactly as reported, for example `3.5-5.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<ResultFlag>,
}

/// A complete result set for one order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_date: Option<DateTime<Utc>>,
    pub status: ResultStatus,
    pub tests: Vec<LabTestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performing_lab: Option<String>,
}

impl LabResult {
    /// Returns the first test with the given code.
    pub fn test(&self, code: &str) -> Option<&LabTestResult> {
        self.tests.iter().find(|t| t.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_abnormal_flags() {
        let cases = [
            ("H", ResultFlag::High),
            ("L", ResultFlag::Low),
            ("HH", ResultFlag::CriticalHigh),
            ("CH", ResultFlag::CriticalHigh),
            ("LL", ResultFlag::CriticalLow),
            ("CL", ResultFlag::CriticalLow),
            ("A", ResultFlag::Abnormal),
            ("N", ResultFlag::Normal),
            ("", ResultFlag::Normal),
            ("ZZ", ResultFlag::Normal),
        ];

        for (code, expected) in cases {
            assert_eq!(ResultFlag::from_hl7(code), expected, "flag code {code:?}");
        }
    }

    #[test]
    fn flag_decoding_tolerates_case_and_padding() {
        assert_eq!(ResultFlag::from_hl7(" h "), ResultFlag::High);
        assert_eq!(ResultFlag::from_hl7("cl"), ResultFlag::CriticalLow);
    }

    #[test]
    fn value_keeps_qualitative_text() {
        assert_eq!(TestValue::from_raw("12.5"), TestValue::Numeric(12.5));
        assert_eq!(TestValue::from_raw(" 140 "), TestValue::Numeric(140.0));
        assert_eq!(
            TestValue::from_raw("Positive"),
            TestValue::Text("Positive".into())
        );
        assert_eq!(TestValue::from_raw("12.5 H"), TestValue::Text("12.5 H".into()));
        assert_eq!(TestValue::from_raw("NaN"), TestValue::Text("NaN".into()));
        assert_eq!(TestValue::from_raw(""), TestValue::Text(String::new()));
    }

    #[test]
    fn value_serialises_untagged() {
        let json = serde_json::to_string(&vec![
            TestValue::Numeric(6.8),
            TestValue::Text("Positive".into()),
        ])
        .expect("serialise");
        assert_eq!(json, r#"[6.8,"Positive"]"#);

        let back: Vec<TestValue> = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back[0].as_f64(), Some(6.8));
        assert_eq!(back[1].as_f64(), None);
    }

    #[test]
    fn flags_serialise_snake_case() {
        let json = serde_json::to_string(&ResultFlag::CriticalHigh).expect("serialise");
        assert_eq!(json, r#""critical_high""#);
    }
}
