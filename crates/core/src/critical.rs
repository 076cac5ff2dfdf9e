//! Critical value detection.
//!
//! A result is critical when its numeric value lies strictly outside the life-threatening
//! bounds in [`lab_types::codes`]. Tests without a threshold (for example `CREAT`) and
//! qualitative values are skipped. This is independent of the lab-reported flag: an `HH`
//! flag on a test without a threshold does not make it critical here.

use lab_types::codes::critical_threshold;
use lab_types::{LabResult, LabTestResult};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Outcome of [`check_critical`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriticalReport {
    pub has_critical: bool,
    /// Critical tests, in the order they appear in the result.
    pub critical_tests: Vec<LabTestResult>,
}

/// Which bound a critical value crossed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Low,
    High,
}

/// One critical value, with the limit it crossed.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriticalFinding {
    pub code: String,
    pub value: f64,
    pub unit: String,
    pub direction: Direction,
    pub limit: f64,
}

/// Returns the tests of `result` whose values fall outside their critical bounds.
pub fn check_critical(result: &LabResult) -> CriticalReport {
    let critical_tests: Vec<LabTestResult> = result
        .tests
        .iter()
        .filter(|test| is_critical(test))
        .cloned()
        .collect();

    CriticalReport {
        has_critical: !critical_tests.is_empty(),
        critical_tests,
    }
}

fn is_critical(test: &LabTestResult) -> bool {
    match (critical_threshold(&test.code), test.value.as_f64()) {
        (Some(threshold), Some(value)) => threshold.is_violated_by(value),
        _ => false,
    }
}

fn finding_for(test: &LabTestResult) -> Option<CriticalFinding> {
    let threshold = critical_threshold(&test.code)?;
    let value = test.value.as_f64()?;

    let (direction, limit) = match (threshold.low, threshold.high) {
        (Some(low), _) if value < low => (Direction::Low, low),
        (_, Some(high)) if value > high => (Direction::High, high),
        _ => return None,
    };

    Some(CriticalFinding {
        code: test.code.clone(),
        value,
        unit: test
            .unit
            .clone()
            .unwrap_or_else(|| threshold.unit.to_string()),
        direction,
        limit,
    })
}

impl CriticalReport {
    /// Describes each critical test for notification.
    pub fn findings(&self) -> Vec<CriticalFinding> {
        self.critical_tests.iter().filter_map(finding_for).collect()
    }
}

impl fmt::Display for CriticalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_critical {
            return f.write_str("no critical values");
        }

        write!(f, "{} critical value(s):", self.critical_tests.len())?;
        for (i, finding) in self.findings().iter().enumerate() {
            let sep = if i == 0 { " " } else { "; " };
            let bound = match finding.direction {
                Direction::Low => "below",
                Direction::High => "above",
            };
            write!(
                f,
                "{sep}{} {} {} ({bound} {})",
                finding.code, finding.value, finding.unit, finding.limit
            )?;
        }
        Ok(())
    }
}
