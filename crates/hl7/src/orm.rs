//! ORM^O01 order message generation.
//!
//! One message per order: MSH, PID, ORC, then one OBR per requested test, joined with `\r`.

use crate::fields::{msh, obr, orc, pid};
use crate::message::{DEFAULT_VERSION, FIELD_SEPARATOR};
use crate::timestamp;
use chrono::Utc;
use lab_types::{LabOrder, Priority};

pub const SENDING_APPLICATION: &str = "DIALYSIS_APP";
pub const SENDING_FACILITY: &str = "DIALYSIS_FACILITY";
pub const RECEIVING_APPLICATION: &str = "LAB_SYSTEM";
pub const ENCODING_CHARACTERS: &str = "^~\\&";
pub const ORM_MESSAGE_TYPE: &str = "ORM^O01";
/// Processing id `P` (production).
pub const PROCESSING_ID: &str = "P";
/// ORC-1 order control code for a new order.
pub const NEW_ORDER: &str = "NW";
pub const SEGMENT_TERMINATOR: &str = "\r";

/// Builds an ORM^O01 message for `order` with a fresh control id.
///
/// The control id is `MSG` followed by the current epoch milliseconds. Two calls within the
/// same millisecond produce the same id; callers submitting faster than that should use
/// [`generate_orm_with_control_id`] with their own unique id.
pub fn generate_orm(order: &LabOrder) -> String {
    generate_orm_with_control_id(order, &new_control_id())
}

/// Returns a control id of the form `MSG<epoch millis>`.
pub fn new_control_id() -> String {
    format!("MSG{}", Utc::now().timestamp_millis())
}

/// Builds an ORM^O01 message for `order` using the supplied MSH-10 control id.
pub fn generate_orm_with_control_id(order: &LabOrder, control_id: &str) -> String {
    let order_time = timestamp::encode(&order.order_date);
    let priority = priority_code(order.priority);
    let physician = order.collecting_physician.as_deref().map(escape);

    // MSH-6 carries the patient id; downstream lab systems key on it.
    let header = SegmentBuilder::new("MSH")
        .set(msh::ENCODING_CHARACTERS, ENCODING_CHARACTERS)
        .set(msh::SENDING_APPLICATION, SENDING_APPLICATION)
        .set(msh::SENDING_FACILITY, SENDING_FACILITY)
        .set(msh::RECEIVING_APPLICATION, RECEIVING_APPLICATION)
        .set(msh::RECEIVING_FACILITY, escape(&order.patient_id))
        .set(msh::DATE_TIME, order_time.as_str())
        .set(msh::MESSAGE_TYPE, ORM_MESSAGE_TYPE)
        .set(msh::CONTROL_ID, control_id)
        .set(msh::PROCESSING_ID, PROCESSING_ID)
        .set(msh::VERSION, DEFAULT_VERSION);

    let patient = SegmentBuilder::new("PID")
        .set(pid::SET_ID, "1")
        .set(pid::PATIENT_ID, escape(&order.patient_id))
        .set(pid::PATIENT_NAME, hl7_name(&order.patient_name))
        .set(pid::DATE_OF_BIRTH, order.patient_date_of_birth.replace('-', ""));

    let common_order = SegmentBuilder::new("ORC")
        .set(orc::ORDER_CONTROL, NEW_ORDER)
        .set(orc::PLACER_ORDER, escape(&order.id))
        .set(orc::QUANTITY_TIMING, format!("^^^^^{priority}"))
        .set(orc::TRANSACTION_DATE, order_time.as_str())
        .set_opt(orc::ORDERING_PROVIDER, physician.clone());

    let fasting = if order.fasting.unwrap_or(false) { "Y" } else { "N" };
    let clinical_info = order.clinical_info.as_deref().map(escape);

    let requests = order.tests.iter().enumerate().map(|(index, test)| {
        SegmentBuilder::new("OBR")
            .set(obr::SET_ID, (index + 1).to_string())
            .set(obr::PLACER_ORDER, escape(&order.id))
            .set(
                obr::SERVICE_ID,
                format!("{}^{}", escape(&test.code), escape(&test.name)),
            )
            .set(obr::PRIORITY, priority)
            .set(obr::REQUESTED_DATE, order_time.as_str())
            .set(obr::FASTING, fasting)
            .set_opt(obr::CLINICAL_INFO, clinical_info.clone())
            .set_opt(obr::ORDERING_PROVIDER, physician.clone())
            .render()
    });

    [header.render(), patient.render(), common_order.render()]
        .into_iter()
        .chain(requests)
        .collect::<Vec<_>>()
        .join(SEGMENT_TERMINATOR)
}

/// Maps an order priority to its HL7 code: stat `S`, urgent `A` (ASAP), routine `R`.
pub fn priority_code(priority: Priority) -> &'static str {
    match priority {
        Priority::Stat => "S",
        Priority::Urgent => "A",
        Priority::Routine => "R",
    }
}

/// Composes an XPN name by replacing the first space with `^`.
///
/// Only a two-token name comes out in proper HL7 component form; further spaces are left
/// in place.
pub fn hl7_name(display_name: &str) -> String {
    escape(display_name.trim()).replacen(' ', "^", 1)
}

/// Escapes HL7 delimiters inside free text so a value cannot split a field or component.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\E\\"),
            '|' => out.push_str("\\F\\"),
            '^' => out.push_str("\\S\\"),
            '~' => out.push_str("\\R\\"),
            '&' => out.push_str("\\T\\"),
            '\r' | '\n' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// Assembles one segment by HL7 field position.
struct SegmentBuilder {
    segment_type: &'static str,
    /// `fields[i]` holds field `i + 1`.
    fields: Vec<String>,
}

impl SegmentBuilder {
    fn new(segment_type: &'static str) -> Self {
        Self {
            segment_type,
            fields: Vec::new(),
        }
    }

    fn set(mut self, position: usize, value: impl Into<String>) -> Self {
        if self.fields.len() < position {
            self.fields.resize(position, String::new());
        }
        self.fields[position - 1] = value.into();
        self
    }

    fn set_opt(self, position: usize, value: Option<String>) -> Self {
        match value {
            Some(v) => self.set(position, v),
            None => self,
        }
    }

    fn render(self) -> String {
        let separator = FIELD_SEPARATOR.to_string();
        // MSH-1 is the separator itself, so rendering starts at MSH-2.
        let skip = usize::from(self.segment_type == "MSH");
        let body = self.fields[skip.min(self.fields.len())..].join(&separator);
        format!("{}{}{}", self.segment_type, separator, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hl7Message;
    use chrono::TimeZone;
    use lab_types::{LabTest, OrderStatus, TestList};

    fn order() -> LabOrder {
        LabOrder {
            id: "ORD-1".into(),
            patient_id: "P-100".into(),
            patient_name: "Jane Doe".into(),
            patient_date_of_birth: "1970-03-04".into(),
            order_date: Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap(),
            priority: Priority::Stat,
            tests: TestList::new(vec![
                LabTest::new("K", "Potassium"),
                LabTest::new("HGB", "Hemoglobin"),
            ])
            .unwrap(),
            collecting_physician: Some("Dr Smith".into()),
            clinical_info: Some("Pre-dialysis draw".into()),
            fasting: Some(true),
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn renders_expected_segments() {
        let message = generate_orm_with_control_id(&order(), "MSG1");
        let lines: Vec<&str> = message.split('\r').collect();

        assert_eq!(
            lines,
            [
                "MSH|^~\\&|DIALYSIS_APP|DIALYSIS_FACILITY|LAB_SYSTEM|P-100|20240115083000||ORM^O01|MSG1|P|2.5",
                "PID|1||P-100||Jane^Doe||19700304",
                "ORC|NW|ORD-1|||||^^^^^S||20240115083000|||Dr Smith",
                "OBR|1|ORD-1||K^Potassium|S|20240115083000||||||Y|Pre-dialysis draw|||Dr Smith",
                "OBR|2|ORD-1||HGB^Hemoglobin|S|20240115083000||||||Y|Pre-dialysis draw|||Dr Smith",
            ]
        );
    }

    #[test]
    fn optional_fields_are_left_empty() {
        let mut order = order();
        order.collecting_physician = None;
        order.clinical_info = None;
        order.fasting = None;
        order.priority = Priority::Routine;

        let message = generate_orm_with_control_id(&order, "MSG2");
        let lines: Vec<&str> = message.split('\r').collect();
        assert_eq!(lines[2], "ORC|NW|ORD-1|||||^^^^^R||20240115083000");
        assert_eq!(
            lines[3],
            "OBR|1|ORD-1||K^Potassium|R|20240115083000||||||N"
        );
    }

    #[test]
    fn generated_message_parses_back() {
        let raw = generate_orm_with_control_id(&order(), "MSG3");
        let message = Hl7Message::parse(&raw).expect("generated ORM should parse");

        assert!(message.is_orm());
        assert_eq!(message.message_id, "MSG3");
        assert_eq!(message.version, "2.5");
        assert_eq!(message.timestamp, order().order_date);
        assert_eq!(message.msh().field(msh::RECEIVING_FACILITY), Some("P-100"));
        assert_eq!(message.segments_of("OBR").count(), 2);
        assert_eq!(
            message
                .segment("PID")
                .and_then(|s| s.field(pid::PATIENT_ID)),
            Some("P-100")
        );
    }

    #[test]
    fn control_id_uses_epoch_millis() {
        let before = Utc::now().timestamp_millis();
        let id = new_control_id();
        let millis: i64 = id
            .strip_prefix("MSG")
            .expect("MSG prefix")
            .parse()
            .expect("numeric suffix");
        assert!(millis >= before);

        let message = Hl7Message::parse(&generate_orm(&order())).expect("parse");
        assert!(message.message_id.starts_with("MSG"));
    }

    #[test]
    fn maps_priorities() {
        assert_eq!(priority_code(Priority::Stat), "S");
        assert_eq!(priority_code(Priority::Urgent), "A");
        assert_eq!(priority_code(Priority::Routine), "R");
    }

    #[test]
    fn name_composition_replaces_first_space_only() {
        assert_eq!(hl7_name("Jane Doe"), "Jane^Doe");
        assert_eq!(hl7_name("Mary Ann Smith"), "Mary^Ann Smith");
        assert_eq!(hl7_name("Cher"), "Cher");
    }

    #[test]
    fn escapes_delimiters_in_free_text() {
        assert_eq!(escape("K+ | Na^"), "K+ \\F\\ Na\\S\\");
        assert_eq!(escape("A&B~C\\D"), "A\\T\\B\\R\\C\\E\\D");

        let mut order = order();
        order.clinical_info = Some("line1|line2\nline3".into());
        let raw = generate_orm_with_control_id(&order, "MSG4");
        let message = Hl7Message::parse(&raw).expect("parse");
        let obr = message.segment("OBR").expect("OBR present");
        assert_eq!(obr.field(obr::CLINICAL_INFO), Some("line1\\F\\line2 line3"));
        assert_eq!(message.segments.len(), 5);
    }
}
