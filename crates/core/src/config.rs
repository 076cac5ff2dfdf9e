//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the connector. Library
//! code never reads environment variables, so request handling sees one consistent view even in
//! multi-threaded runtimes and test harnesses.

use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, PRODUCTION_ENV_VALUE};
use crate::{LabCoreResult, LabError};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Deployment environment. Decides between the mock and the live provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    NonProduction,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::NonProduction => "non_production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lab configuration resolved at startup.
#[derive(Clone)]
pub struct LabConfig {
    environment: Environment,
    provider_base_url: String,
    api_key: String,
    request_timeout: Duration,
}

impl LabConfig {
    /// Create a new `LabConfig`.
    ///
    /// In production the provider URL must be an `http(s)` URL and the API key must be set.
    /// Outside production both may be empty because the mock strategy never uses them.
    pub fn new(
        environment: Environment,
        provider_base_url: String,
        api_key: String,
        request_timeout: Duration,
    ) -> LabCoreResult<Self> {
        if request_timeout.is_zero() {
            return Err(LabError::InvalidConfig(
                "request timeout must be greater than zero".into(),
            ));
        }

        let provider_base_url = provider_base_url.trim().trim_end_matches('/').to_string();
        let api_key = api_key.trim().to_string();

        if environment.is_production() {
            if provider_base_url.is_empty() {
                return Err(LabError::InvalidConfig(
                    "provider base URL is required in production".into(),
                ));
            }
            if !(provider_base_url.starts_with("http://")
                || provider_base_url.starts_with("https://"))
            {
                return Err(LabError::InvalidConfig(format!(
                    "provider base URL must be http(s): {provider_base_url}"
                )));
            }
            if api_key.is_empty() {
                return Err(LabError::InvalidConfig(
                    "provider API key is required in production".into(),
                ));
            }
        }

        Ok(Self {
            environment,
            provider_base_url,
            api_key,
            request_timeout,
        })
    }

    /// Configuration for local development and tests: mock provider, default timeout.
    pub fn non_production() -> Self {
        Self {
            environment: Environment::NonProduction,
            provider_base_url: String::new(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn provider_base_url(&self) -> &str {
        &self.provider_base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl fmt::Debug for LabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabConfig")
            .field("environment", &self.environment)
            .field("provider_base_url", &self.provider_base_url)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Parse the environment from an optional string value.
///
/// Only the exact (trimmed) value `production` selects [`Environment::Production`]. Anything
/// else, including `None`, is non-production.
pub fn environment_from_env_value(value: Option<String>) -> Environment {
    match value.as_deref().map(str::trim) {
        Some(PRODUCTION_ENV_VALUE) => Environment::Production,
        _ => Environment::NonProduction,
    }
}

/// Parse the request timeout, in seconds, from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_REQUEST_TIMEOUT_SECS`].
pub fn timeout_from_env_value(value: Option<String>) -> LabCoreResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let secs = match value {
        Some(v) => v.parse::<u64>().map_err(|_| {
            LabError::InvalidConfig(format!("timeout must be a whole number of seconds: {v}"))
        })?,
        None => DEFAULT_REQUEST_TIMEOUT_SECS,
    };

    Ok(Duration::from_secs(secs))
}
