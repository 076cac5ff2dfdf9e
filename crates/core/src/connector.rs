//! Lab Connector: the single entry point for talking to a laboratory.
//!
//! The strategy (mock or live) is chosen once at construction and never re-checked. Calls
//! never fail with an error; provider problems come back as failed outcomes.

use crate::config::{Environment, LabConfig};
use crate::internal::{self, InternalRecord};
use crate::outcome::{FetchOutcome, SubmitOutcome};
use crate::strategy::{LiveStrategy, MockStrategy, TransportStrategy};
use crate::transport::{HttpTransport, LabTransport};
use crate::LabCoreResult;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use lab_types::{LabOrder, LabResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct LabConnector {
    strategy: Arc<dyn TransportStrategy>,
}

impl LabConnector {
    /// Builds a connector for `config`.
    ///
    /// Production gets a [`LiveStrategy`] over an [`HttpTransport`]; every other environment
    /// gets the [`MockStrategy`] and no transport is created.
    pub fn new(config: &LabConfig) -> LabCoreResult<Self> {
        match config.environment() {
            Environment::NonProduction => Ok(Self::with_strategy(Arc::new(MockStrategy))),
            Environment::Production => {
                let transport = HttpTransport::new(config)?;
                Ok(Self::with_transport(config, Arc::new(transport)))
            }
        }
    }

    /// Like [`LabConnector::new`], but uses `transport` when `config` selects production.
    pub fn with_transport(config: &LabConfig, transport: Arc<dyn LabTransport>) -> Self {
        let strategy: Arc<dyn TransportStrategy> = match config.environment() {
            Environment::Production => {
                Arc::new(LiveStrategy::new(transport, config.request_timeout()))
            }
            Environment::NonProduction => Arc::new(MockStrategy),
        };
        Self::with_strategy(strategy)
    }

    pub fn with_strategy(strategy: Arc<dyn TransportStrategy>) -> Self {
        tracing::info!(strategy = strategy.name(), "lab connector ready");
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub async fn submit_order(&self, order: &LabOrder) -> SubmitOutcome {
        self.strategy.submit_order(order).await
    }

    pub async fn fetch_results(&self, order_id: &str) -> FetchOutcome {
        self.strategy.fetch_results(order_id).await
    }

    /// Submits `orders` with at most `concurrency` requests in flight.
    ///
    /// Outcomes are returned in the same order as `orders`. A concurrency of zero is treated
    /// as one.
    pub async fn submit_orders(
        &self,
        orders: &[LabOrder],
        concurrency: usize,
    ) -> Vec<SubmitOutcome> {
        stream::iter(orders)
            .map(|order| self.submit_order(order))
            .buffered(concurrency.max(1))
            .collect::<Vec<_>>()
            .boxed()
            .await
    }

    pub fn to_internal_format(&self, result: &LabResult) -> InternalRecord {
        internal::to_internal_format(result)
    }
}
