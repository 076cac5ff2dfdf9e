//! Structured results of connector calls.
//!
//! Provider failures are reported here rather than returned as errors, so callers always get
//! a value they can log, store or show.

use lab_types::{LabResult, OrderStatus};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub success: bool,
    /// Order id as acknowledged by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Control id (MSH-10) of the message that was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Status the caller should move the order to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitOutcome {
    pub fn submitted(order_id: String, message_id: Option<String>) -> Self {
        Self {
            success: true,
            order_id: Some(order_id),
            message_id,
            status: Some(OrderStatus::Submitted),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            order_id: None,
            message_id: None,
            status: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<LabResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn found(result: LabResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcomes_serialise_without_empty_fields() {
        let json = serde_json::to_value(SubmitOutcome::failed("boom")).expect("serialise");
        assert_eq!(json, serde_json::json!({ "success": false, "error": "boom" }));

        let json = serde_json::to_value(FetchOutcome::failed("boom")).expect("serialise");
        assert_eq!(json, serde_json::json!({ "success": false, "error": "boom" }));
    }

    #[test]
    fn submitted_outcome_carries_next_status() {
        let outcome = SubmitOutcome::submitted("ORD-1".into(), Some("MSG1".into()));
        let json = serde_json::to_value(outcome).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "orderId": "ORD-1",
                "messageId": "MSG1",
                "status": "submitted"
            })
        );
    }
}
