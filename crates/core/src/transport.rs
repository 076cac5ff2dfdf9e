//! Outbound transport to the laboratory provider.
//!
//! The engine hands a [`TransportRequest`] to a [`LabTransport`] and gets back the response
//! body as text. Framing and authentication are the transport's concern; the strategy layer
//! only applies the deadline and interprets the body.

use crate::config::LabConfig;
use crate::constants::{API_KEY_HEADER, HL7_CONTENT_TYPE, ORDERS_PATH};
use crate::{LabCoreResult, LabError, TransportError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

/// A single exchange with the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportRequest {
    /// Deliver an ORM^O01 message.
    SubmitOrder { message: String },
    /// Retrieve the ORU^R01 text for an order.
    FetchResults { order_id: String },
}

impl TransportRequest {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubmitOrder { .. } => "submit-order",
            Self::FetchResults { .. } => "fetch-results",
        }
    }
}

#[async_trait]
pub trait LabTransport: Send + Sync {
    /// Sends `request` and returns the response body.
    async fn send(&self, request: TransportRequest) -> Result<String, TransportError>;
}

/// HTTP transport for providers exposing a REST endpoint for HL7 v2 payloads.
///
/// - `SubmitOrder`: `POST {base}/orders` with the raw message as body
/// - `FetchResults`: `GET {base}/orders/{order_id}/results`
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &LabConfig) -> LabCoreResult<Self> {
        let base_url = Url::parse(config.provider_base_url()).map_err(|e| {
            LabError::InvalidConfig(format!(
                "invalid provider base URL {}: {e}",
                config.provider_base_url()
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(LabError::InvalidConfig(format!(
                "provider base URL cannot carry a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key().to_string(),
        })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Provider("provider base URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl LabTransport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<String, TransportError> {
        let builder = match request {
            TransportRequest::SubmitOrder { message } => self
                .client
                .post(self.endpoint(&[ORDERS_PATH])?)
                .header(CONTENT_TYPE, HL7_CONTENT_TYPE)
                .body(message),
            TransportRequest::FetchResults { order_id } => self
                .client
                .get(self.endpoint(&[ORDERS_PATH, order_id.as_str(), "results"])?),
        };

        let response = builder
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use std::time::Duration;

    fn transport(base: &str) -> HttpTransport {
        let cfg = LabConfig::new(
            Environment::Production,
            base.into(),
            "key".into(),
            Duration::from_secs(5),
        )
        .expect("valid config");
        HttpTransport::new(&cfg).expect("build transport")
    }

    #[test]
    fn request_kinds() {
        let submit = TransportRequest::SubmitOrder {
            message: "MSH|".into(),
        };
        let fetch = TransportRequest::FetchResults {
            order_id: "ORD-1".into(),
        };
        assert_eq!(submit.kind(), "submit-order");
        assert_eq!(fetch.kind(), "fetch-results");
    }

    #[test]
    fn endpoints_extend_the_base_path() {
        let t = transport("https://lab.example/api");
        assert_eq!(
            t.endpoint(&[ORDERS_PATH]).expect("url").as_str(),
            "https://lab.example/api/orders"
        );

        let t = transport("https://lab.example");
        assert_eq!(
            t.endpoint(&[ORDERS_PATH, "ORD-1", "results"])
                .expect("url")
                .as_str(),
            "https://lab.example/orders/ORD-1/results"
        );
    }

    #[test]
    fn order_ids_are_percent_encoded() {
        let t = transport("https://lab.example");
        let url = t
            .endpoint(&[ORDERS_PATH, "A/B C", "results"])
            .expect("url");
        assert_eq!(url.path(), "/orders/A%2FB%20C/results");
    }
}
