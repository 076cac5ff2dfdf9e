//! Mapping from [`LabResult`] to the flat record kept by the persistence layer.
//!
//! Only codes with an entry in [`lab_types::codes::internal_field`] are carried over. The
//! persistence schema models a fixed set of analytes and anything else is dropped here.

use chrono::{DateTime, Utc};
use lab_types::codes::internal_field;
use lab_types::{LabResult, TestValue};
use serde::Serialize;
use std::collections::BTreeMap;

/// A result flattened to internal field names.
///
/// Serialises as one JSON object: the metadata keys plus one key per mapped analyte, for
/// example `{"result_id": "...", "potassium": 5.2}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InternalRecord {
    pub result_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub patient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performing_lab: Option<String>,
    #[serde(flatten)]
    pub values: BTreeMap<&'static str, TestValue>,
}

impl InternalRecord {
    pub fn value(&self, field: &str) -> Option<&TestValue> {
        self.values.get(field)
    }
}

/// Flattens `result` into an [`InternalRecord`].
///
/// When a code appears more than once the last occurrence wins.
pub fn to_internal_format(result: &LabResult) -> InternalRecord {
    let mut values = BTreeMap::new();
    for test in &result.tests {
        match internal_field(&test.code) {
            Some(field) => {
                values.insert(field, test.value.clone());
            }
            None => tracing::trace!(code = %test.code, "no internal field for test code; dropped"),
        }
    }

    InternalRecord {
        result_id: result.id.clone(),
        order_id: result.order_id.clone(),
        patient_id: result.patient_id.clone(),
        collection_date: result.collection_date,
        result_date: result.result_date,
        performing_lab: result.performing_lab.clone(),
        values,
    }
}
