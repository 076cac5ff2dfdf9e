//! HL7 v2.x wire boundary for laboratory messaging.
//!
//! This crate turns pipe-delimited HL7 v2 text into domain values and back:
//! - tokenising raw text into an [`Hl7Message`] (`message`)
//! - the compact `YYYYMMDD[HHMM[SS]]` timestamp codec (`timestamp`)
//! - building ORM^O01 order messages from a [`lab_types::LabOrder`] (`orm`)
//! - extracting a [`lab_types::LabResult`] from ORU^R01 result messages (`oru`)
//!
//! Field positions are declared once in `fields` and shared by both directions.
//!
//! Not covered: MLLP framing (`0x0B`/`0x1C`), conformance-profile validation, escape-sequence
//! decoding on input. Segments are joined with `\r` and the transport adds any framing.

pub mod fields;
pub mod message;
pub mod orm;
pub mod oru;
pub mod timestamp;

pub use message::{Hl7Message, Hl7Segment};
pub use orm::{generate_orm, generate_orm_with_control_id};
pub use oru::{parse_oru, parse_oru_text};

/// Errors returned by the `hl7` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum Hl7Error {
    /// The text is not an HL7 message (empty, or no leading MSH segment).
    #[error("invalid HL7 message: {0}")]
    InvalidMessage(String),

    /// A segment required to interpret the message is absent.
    #[error("missing required segment: {0}")]
    MissingSegment(&'static str),

    /// A single field could not be interpreted.
    ///
    /// Parsing entry points recover from this locally; only the strict helpers return it.
    #[error("malformed {field} field: {value:?}")]
    MalformedField { field: &'static str, value: String },
}

/// Type alias for Results that can fail with an [`Hl7Error`].
pub type Hl7Result<T> = Result<T, Hl7Error>;
