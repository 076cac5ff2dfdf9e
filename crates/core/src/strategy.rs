//! Transport strategies.
//!
//! The environment is consulted once, when [`crate::LabConnector`] is built, and yields one of
//! two strategies:
//! - [`MockStrategy`]: deterministic success, never touches a transport
//! - [`LiveStrategy`]: generates/parses HL7 and calls a [`LabTransport`] under a deadline
//!
//! Both order and result paths switch together; there is no partial mocking.

use crate::constants::MOCK_ORDER_PREFIX;
use crate::mock::mock_result;
use crate::outcome::{FetchOutcome, SubmitOutcome};
use crate::transport::{LabTransport, TransportRequest};
use crate::{LabError, TransportError};
use async_trait::async_trait;
use lab_types::LabOrder;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait TransportStrategy: Send + Sync {
    /// Name used in logs and the health endpoint.
    fn name(&self) -> &'static str;

    async fn submit_order(&self, order: &LabOrder) -> SubmitOutcome;

    async fn fetch_results(&self, order_id: &str) -> FetchOutcome;
}

/// Non-production strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockStrategy;

#[async_trait]
impl TransportStrategy for MockStrategy {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn submit_order(&self, order: &LabOrder) -> SubmitOutcome {
        tracing::info!(order_id = %order.id, "mock lab: order accepted");
        SubmitOutcome::submitted(format!("{MOCK_ORDER_PREFIX}{}", order.id), None)
    }

    async fn fetch_results(&self, order_id: &str) -> FetchOutcome {
        tracing::info!(order_id, "mock lab: returning fixed result");
        FetchOutcome::found(mock_result(order_id))
    }
}

/// Production strategy backed by a real transport.
pub struct LiveStrategy {
    transport: Arc<dyn LabTransport>,
    timeout: Duration,
}

impl LiveStrategy {
    pub fn new(transport: Arc<dyn LabTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    async fn send(&self, request: TransportRequest) -> Result<String, TransportError> {
        let kind = request.kind();
        let response = tokio::time::timeout(self.timeout, self.transport.send(request))
            .await
            .unwrap_or(Err(TransportError::Timeout(self.timeout)));

        if let Err(err) = &response {
            tracing::warn!(kind, error = %err, "lab transport failed");
        }
        response
    }
}

#[async_trait]
impl TransportStrategy for LiveStrategy {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn submit_order(&self, order: &LabOrder) -> SubmitOutcome {
        let control_id = hl7::orm::new_control_id();
        let message = hl7::generate_orm_with_control_id(order, &control_id);

        match self.send(TransportRequest::SubmitOrder { message }).await {
            Ok(_) => {
                tracing::info!(
                    order_id = %order.id,
                    control_id = %control_id,
                    tests = order.tests.len(),
                    "order submitted to lab"
                );
                SubmitOutcome::submitted(order.id.clone(), Some(control_id))
            }
            Err(err) => SubmitOutcome::failed(err.to_string()),
        }
    }

    async fn fetch_results(&self, order_id: &str) -> FetchOutcome {
        let request = TransportRequest::FetchResults {
            order_id: order_id.to_string(),
        };
        let body = match self.send(request).await {
            Ok(body) => body,
            Err(err) => return FetchOutcome::failed(err.to_string()),
        };

        match hl7::parse_oru_text(&body) {
            Ok(result) => {
                tracing::info!(order_id, tests = result.tests.len(), "lab results received");
                FetchOutcome::found(result)
            }
            Err(err) => {
                let err = LabError::from(err);
                tracing::warn!(order_id, error = %err, "lab returned an unreadable result");
                FetchOutcome::failed(err.to_string())
            }
        }
    }
}
