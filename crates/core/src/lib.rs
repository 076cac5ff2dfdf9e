//! # Lab Core
//!
//! Orchestration for laboratory order and result exchange.
//!
//! This crate sits between the clinical application and a laboratory provider:
//! - the Critical Value Engine (`critical`) flags life-threatening results
//! - the Lab Connector (`connector`) submits orders and fetches results through a strategy
//!   chosen once from the runtime environment (`strategy`, `transport`, `mock`)
//! - results are flattened to the internal persistence schema (`internal`)
//!
//! **No API concerns**: HTTP routing and CLI parsing belong in the binaries. Wire encoding
//! belongs in the `hl7` crate.

pub mod config;
pub mod connector;
pub mod constants;
pub mod critical;
pub mod error;
pub mod internal;
pub mod mock;
pub mod outcome;
pub mod strategy;
pub mod transport;

pub use config::{Environment, LabConfig};
pub use connector::LabConnector;
pub use critical::{check_critical, CriticalFinding, CriticalReport, Direction};
pub use error::{LabCoreResult, LabError, TransportError};
pub use internal::{to_internal_format, InternalRecord};
pub use outcome::{FetchOutcome, SubmitOutcome};
pub use strategy::{LiveStrategy, MockStrategy, TransportStrategy};
pub use transport::{HttpTransport, LabTransport, TransportRequest};
