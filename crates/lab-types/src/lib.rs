//! Domain model for laboratory orders and results.
//!
//! This crate holds the types shared by the HL7 wire boundary (`hl7`) and the orchestration
//! layer (`lab-core`):
//! - orders placed upstream ([`LabOrder`]) and their lifecycle ([`OrderStatus`])
//! - results returned by a laboratory ([`LabResult`], [`LabTestResult`])
//! - static code tables (test catalogue, critical thresholds, internal field names)
//!
//! Nothing here performs I/O. Every type is plain data with validated constructors.

pub mod codes;
pub mod order;
pub mod result;

pub use codes::{CriticalThreshold, TestInfo};
pub use order::{LabOrder, LabTest, OrderStatus, Priority, TestList};
pub use result::{LabResult, LabTestResult, ResultFlag, ResultStatus, TestValue};

/// Errors that can occur when constructing or updating domain values.
#[derive(Debug, thiserror::Error)]
pub enum LabTypesError {
    /// An order was built without any tests.
    #[error("an order must contain at least one test")]
    EmptyTestList,

    /// A status change that the order lifecycle does not allow.
    #[error("invalid order status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// Type alias for Results that can fail with a [`LabTypesError`].
pub type LabTypesResult<T> = Result<T, LabTypesError>;
