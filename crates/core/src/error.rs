use std::time::Duration;

/// Failures raised while talking to the laboratory provider.
///
/// These never escape the connector: [`crate::LabConnector`] folds them into a failed
/// outcome carrying the error text.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider error: {0}")]
    Provider(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("HL7 error: {0}")]
    Hl7(#[from] hl7::Hl7Error),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type LabCoreResult<T> = std::result::Result<T, LabError>;
