//! Constants used throughout the lab core crate.
//!
//! Environment variable names are read by the binaries only; library code receives a resolved
//! [`crate::config::LabConfig`].

/// Selects the transport strategy. Only the exact value `production` enables live traffic.
pub const LAB_ENV_VAR: &str = "LAB_ENV";

/// Value of [`LAB_ENV_VAR`] that selects the live provider.
pub const PRODUCTION_ENV_VALUE: &str = "production";

/// Base URL of the laboratory provider API.
pub const LAB_PROVIDER_URL_VAR: &str = "LAB_PROVIDER_URL";

/// API key sent to the provider.
pub const LAB_API_KEY_VAR: &str = "LAB_API_KEY";

/// Per-request deadline, in whole seconds.
pub const LAB_TIMEOUT_SECS_VAR: &str = "LAB_TIMEOUT_SECS";

/// Request deadline used when [`LAB_TIMEOUT_SECS_VAR`] is unset or empty.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Prefix of the order id echoed back by the mock strategy.
pub const MOCK_ORDER_PREFIX: &str = "MOCK-";

/// Prefix of the result id produced by the mock strategy.
pub const MOCK_RESULT_PREFIX: &str = "MOCK-RESULT-";

/// Path appended to the provider base URL when submitting an order.
pub const ORDERS_PATH: &str = "orders";

/// Content type for raw HL7 v2 pipe-delimited bodies.
pub const HL7_CONTENT_TYPE: &str = "x-application/hl7-v2+er7";

/// Header carrying the provider API key.
pub const API_KEY_HEADER: &str = "X-API-Key";
