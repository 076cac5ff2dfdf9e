//! Lab orders placed by the clinical application.

use crate::{LabTypesError, LabTypesResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Clinical urgency of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Routine,
    Urgent,
    Stat,
}

/// Lifecycle state of an order.
///
/// The engine never advances this on its own. The Lab Connector reports which state a
/// successful call implies and the caller applies it with [`LabOrder::transition_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Submitted,
    Received,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Returns the string representation used on the JSON boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Received => "received",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true once no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the order lifecycle allows moving from `self` to `next`.
    ///
    /// `pending -> submitted -> received/processing -> completed`, with `cancelled`
    /// reachable from every non-terminal state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        if next == Cancelled {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Pending, Submitted)
                | (Submitted, Received)
                | (Submitted, Processing)
                | (Received, Processing)
                | (Received, Completed)
                | (Processing, Completed)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single test requested on an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    /// Lab test code, for example `K` or `HGB`.
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<String>,
}

impl LabTest {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category: None,
            panel: None,
        }
    }
}

/// An ordered list of tests that is guaranteed to be non-empty.
///
/// The guarantee holds from construction and on deserialisation, so an order that reaches
/// the ORM generator always produces at least one OBR segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestList(Vec<LabTest>);

impl TestList {
    /// Creates a `TestList`, rejecting an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`LabTypesError::EmptyTestList`] if `tests` is empty.
    pub fn new(tests: Vec<LabTest>) -> LabTypesResult<Self> {
        if tests.is_empty() {
            return Err(LabTypesError::EmptyTestList);
        }
        Ok(Self(tests))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabTest> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<'a> IntoIterator for &'a TestList {
    type Item = &'a LabTest;
    type IntoIter = std::slice::Iter<'a, LabTest>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for TestList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TestList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tests = Vec::<LabTest>::deserialize(deserializer)?;
        TestList::new(tests).map_err(serde::de::Error::custom)
    }
}

/// An order placed upstream by the clinical application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabOrder {
    pub id: String,
    pub patient_id: String,
    /// Display name as `Given Family`.
    pub patient_name: String,
    /// ISO 8601 date (`YYYY-MM-DD`).
    pub patient_date_of_birth: String,
    pub order_date: DateTime<Utc>,
    pub priority: Priority,
    #[schema(value_type = Vec<LabTest>)]
    pub tests: TestList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collecting_physician: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fasting: Option<bool>,
    #[serde(default = "default_status")]
    pub status: OrderStatus,
}

fn default_status() -> OrderStatus {
    OrderStatus::Pending
}

impl LabOrder {
    /// Moves the order to `next` if the lifecycle allows it.
    ///
    /// # Errors
    ///
    /// Returns [`LabTypesError::InvalidTransition`] and leaves the status unchanged otherwise.
    pub fn transition_to(&mut self, next: OrderStatus) -> LabTypesResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(LabTypesError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_order() -> LabOrder {
        LabOrder {
            id: "ORD-1".into(),
            patient_id: "P-100".into(),
            patient_name: "Jane Doe".into(),
            patient_date_of_birth: "1970-03-04".into(),
            order_date: Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap(),
            priority: Priority::Routine,
            tests: TestList::new(vec![LabTest::new("K", "Potassium")]).unwrap(),
            collecting_physician: None,
            clinical_info: None,
            fasting: None,
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn test_list_rejects_empty() {
        let err = TestList::new(vec![]).expect_err("empty list should fail");
        assert!(matches!(err, LabTypesError::EmptyTestList));
    }

    #[test]
    fn deserialisation_enforces_non_empty_tests() {
        let json = r#"{
            "id": "ORD-1",
            "patientId": "P-100",
            "patientName": "Jane Doe",
            "patientDateOfBirth": "1970-03-04",
            "orderDate": "2024-01-15T08:30:00Z",
            "priority": "stat",
            "tests": []
        }"#;

        let err = serde_json::from_str::<LabOrder>(json).expect_err("should reject empty tests");
        assert!(err.to_string().contains("at least one test"));
    }

    #[test]
    fn deserialises_with_default_status() {
        let json = r#"{
            "id": "ORD-1",
            "patientId": "P-100",
            "patientName": "Jane Doe",
            "patientDateOfBirth": "1970-03-04",
            "orderDate": "2024-01-15T08:30:00Z",
            "priority": "urgent",
            "tests": [{"code": "K", "name": "Potassium"}],
            "fasting": true
        }"#;

        let order: LabOrder = serde_json::from_str(json).expect("parse order");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.priority, Priority::Urgent);
        assert_eq!(order.tests.len(), 1);
        assert_eq!(order.fasting, Some(true));
    }

    #[test]
    fn follows_happy_path_lifecycle() {
        let mut order = sample_order();
        order.transition_to(OrderStatus::Submitted).expect("submit");
        order.transition_to(OrderStatus::Processing).expect("process");
        order.transition_to(OrderStatus::Completed).expect("complete");
        assert!(order.status.is_terminal());
    }

    #[test]
    fn rejects_skipping_submission() {
        let mut order = sample_order();
        let err = order
            .transition_to(OrderStatus::Completed)
            .expect_err("pending cannot complete");
        match err {
            LabTypesError::InvalidTransition { from, to } => {
                assert_eq!(from, OrderStatus::Pending);
                assert_eq!(to, OrderStatus::Completed);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn cancellation_only_from_open_states() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }
}
