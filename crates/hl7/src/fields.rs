//! Field positions used when reading and writing lab messages.
//!
//! Positions follow HL7 numbering (`PID-3` is position 3). For MSH, position 1 is the field
//! separator itself, matching how [`crate::Hl7Segment`] stores MSH fields.
//!
//! The ORU parser reads fields only through the [`FieldSpec`] entries below, so each value
//! it extracts can be traced back to one position (and at most one fallback position).

use crate::Hl7Segment;

pub mod msh {
    pub const ENCODING_CHARACTERS: usize = 2;
    pub const SENDING_APPLICATION: usize = 3;
    pub const SENDING_FACILITY: usize = 4;
    pub const RECEIVING_APPLICATION: usize = 5;
    pub const RECEIVING_FACILITY: usize = 6;
    pub const DATE_TIME: usize = 7;
    pub const MESSAGE_TYPE: usize = 9;
    pub const CONTROL_ID: usize = 10;
    pub const PROCESSING_ID: usize = 11;
    pub const VERSION: usize = 12;
}

pub mod pid {
    pub const SET_ID: usize = 1;
    pub const PATIENT_ID: usize = 3;
    pub const PATIENT_NAME: usize = 5;
    pub const DATE_OF_BIRTH: usize = 7;
}

pub mod orc {
    pub const ORDER_CONTROL: usize = 1;
    pub const PLACER_ORDER: usize = 2;
    pub const QUANTITY_TIMING: usize = 7;
    pub const TRANSACTION_DATE: usize = 9;
    pub const ORDERING_PROVIDER: usize = 12;
}

pub mod obr {
    pub const SET_ID: usize = 1;
    pub const PLACER_ORDER: usize = 2;
    pub const SERVICE_ID: usize = 4;
    pub const PRIORITY: usize = 5;
    pub const REQUESTED_DATE: usize = 6;
    pub const OBSERVATION_DATE: usize = 7;
    /// Carries the fasting flag (`Y`/`N`) on outbound orders.
    pub const FASTING: usize = 12;
    pub const CLINICAL_INFO: usize = 13;
    pub const ORDERING_PROVIDER: usize = 16;
    pub const RESULT_DATE: usize = 22;
}

pub mod obx {
    pub const OBSERVATION_ID: usize = 3;
    pub const VALUE: usize = 5;
    pub const UNITS: usize = 6;
    pub const REFERENCE_RANGE: usize = 7;
    pub const ABNORMAL_FLAGS: usize = 8;
}

/// A canonical field and where to find it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical name of the value in the domain model.
    pub name: &'static str,
    pub segment: &'static str,
    pub position: usize,
    /// Alternate position consulted when `position` is empty.
    pub fallback: Option<usize>,
}

impl FieldSpec {
    const fn at(name: &'static str, segment: &'static str, position: usize) -> Self {
        Self {
            name,
            segment,
            position,
            fallback: None,
        }
    }

    const fn or(self, fallback: usize) -> Self {
        Self {
            fallback: Some(fallback),
            ..self
        }
    }

    /// Reads this field from `segment`, trying the fallback position when the primary is empty.
    pub fn read<'a>(&self, segment: &'a Hl7Segment) -> Option<&'a str> {
        debug_assert_eq!(segment.segment_type, self.segment, "field {}", self.name);
        segment
            .field(self.position)
            .or_else(|| self.fallback.and_then(|f| segment.field(f)))
    }

    /// Reads the 1-based `component` of this field.
    pub fn component<'a>(&self, segment: &'a Hl7Segment, component: usize) -> Option<&'a str> {
        self.read(segment)?
            .split('^')
            .nth(component.checked_sub(1)?)
            .filter(|c| !c.is_empty())
    }
}

pub const PATIENT_ID: FieldSpec = FieldSpec::at("patientId", "PID", pid::PATIENT_ID);
pub const PATIENT_NAME: FieldSpec = FieldSpec::at("patientName", "PID", pid::PATIENT_NAME);
pub const ORDER_ID: FieldSpec = FieldSpec::at("orderId", "OBR", obr::PLACER_ORDER);
pub const COLLECTION_DATE: FieldSpec =
    FieldSpec::at("collectionDate", "OBR", obr::OBSERVATION_DATE);
pub const RESULT_DATE: FieldSpec =
    FieldSpec::at("resultDate", "OBR", obr::RESULT_DATE).or(obr::OBSERVATION_DATE);
pub const OBSERVATION_ID: FieldSpec = FieldSpec::at("code^name", "OBX", obx::OBSERVATION_ID);
pub const VALUE: FieldSpec = FieldSpec::at("value", "OBX", obx::VALUE);
pub const UNIT: FieldSpec = FieldSpec::at("unit", "OBX", obx::UNITS);
pub const REFERENCE_RANGE: FieldSpec = FieldSpec::at("referenceRange", "OBX", obx::REFERENCE_RANGE);
pub const ABNORMAL_FLAG: FieldSpec = FieldSpec::at("flag", "OBX", obx::ABNORMAL_FLAGS);
