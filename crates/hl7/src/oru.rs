//! ORU^R01 result extraction.
//!
//! Builds a [`LabResult`] from a parsed message. Only PID is mandatory; everything else
//! degrades field by field:
//! - no OBR yields a result without order or collection metadata
//! - an unreadable reference range leaves both bounds unset
//! - a non-numeric value is kept as text
//!
//! Every field is read through [`crate::fields`].

use crate::fields::{
    ABNORMAL_FLAG, COLLECTION_DATE, OBSERVATION_ID, ORDER_ID, PATIENT_ID, PATIENT_NAME,
    REFERENCE_RANGE, RESULT_DATE, UNIT, VALUE,
};
use crate::{timestamp, Hl7Error, Hl7Message, Hl7Result, Hl7Segment};
use lab_types::codes::test_info;
use lab_types::{LabResult, LabTestResult, ResultFlag, ResultStatus, TestValue};

/// Prefix applied to the message control id to form the result id.
pub const RESULT_ID_PREFIX: &str = "ORU-";

/// Extracts a [`LabResult`] from an ORU message.
///
/// # Errors
///
/// Returns [`Hl7Error::MissingSegment`] if the message has no PID segment. A result that
/// cannot be attributed to a patient is never returned.
pub fn parse_oru(message: &Hl7Message) -> Hl7Result<LabResult> {
    if !message.is_oru() {
        tracing::debug!(
            message_type = %message.message_type,
            "extracting results from a non-ORU message"
        );
    }

    let pid = message
        .segment("PID")
        .ok_or(Hl7Error::MissingSegment("PID"))?;

    let patient_id = PATIENT_ID.component(pid, 1).unwrap_or_default().to_string();
    let patient_name = PATIENT_NAME.read(pid).map(str::to_string);

    let obr = message.segment("OBR");
    let order_id = obr.and_then(|s| ORDER_ID.read(s)).map(str::to_string);
    let collection_date =
        obr.map(|s| timestamp::decode(COLLECTION_DATE.read(s).unwrap_or_default()));
    let result_date = obr.map(|s| timestamp::decode(RESULT_DATE.read(s).unwrap_or_default()));

    let tests: Vec<LabTestResult> = message.segments_of("OBX").map(parse_observation).collect();

    Ok(LabResult {
        id: format!("{RESULT_ID_PREFIX}{}", message.message_id),
        order_id,
        patient_id,
        patient_name,
        collection_date,
        result_date,
        status: ResultStatus::Final,
        tests,
        performing_lab: message.sending_facility().map(str::to_string),
    })
}

/// Parses raw ORU text in one step.
///
/// # Errors
///
/// Returns [`Hl7Error::InvalidMessage`] or [`Hl7Error::MissingSegment`] as described on
/// [`Hl7Message::parse`] and [`parse_oru`].
pub fn parse_oru_text(raw: &str) -> Hl7Result<LabResult> {
    parse_oru(&Hl7Message::parse(raw)?)
}

fn parse_observation(obx: &Hl7Segment) -> LabTestResult {
    let identifier = OBSERVATION_ID.read(obx).unwrap_or_default();
    let mut components = identifier.split('^');
    let code = components.next().unwrap_or_default().to_string();
    let name = components
        .next()
        .filter(|n| !n.is_empty())
        .or_else(|| test_info(&code).map(|info| info.name))
        .map(str::to_string)
        .unwrap_or_else(|| code.clone());

    let reference_range = REFERENCE_RANGE.read(obx).map(str::to_string);
    let (reference_range_low, reference_range_high) = reference_range
        .as_deref()
        .and_then(parse_reference_range)
        .map_or((None, None), |(low, high)| (Some(low), Some(high)));

    LabTestResult {
        code,
        name,
        value: TestValue::from_raw(VALUE.read(obx).unwrap_or_default()),
        unit: UNIT.read(obx).map(str::to_string),
        reference_range,
        reference_range_low,
        reference_range_high,
        flag: Some(ResultFlag::from_hl7(
            ABNORMAL_FLAG.read(obx).unwrap_or_default(),
        )),
    }
}

/// Parses a `low-high` reference range, splitting on the first `-`.
///
/// Returns `None` unless both bounds parse as numbers.
pub fn parse_reference_range(range: &str) -> Option<(f64, f64)> {
    let (low, high) = range.split_once('-')?;
    match (low.trim().parse::<f64>(), high.trim().parse::<f64>()) {
        (Ok(low), Ok(high)) => Some((low, high)),
        _ => {
            let err = Hl7Error::MalformedField {
                field: "referenceRange",
                value: range.to_string(),
            };
            tracing::debug!("{err}; leaving bounds unset");
            None
        }
    }
}
