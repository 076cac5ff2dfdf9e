//! Segment tokenizer and parsed message model.
//!
//! Responsibilities:
//! - Split raw text into segments on CR and/or LF, ignoring blank lines
//! - Honour the field separator declared by MSH (for the MSH line only)
//! - Extract header metadata (type, control id, version, timestamp)
//!
//! Notes:
//! - Non-MSH segments are always split on `|`, the separator this system exchanges
//! - The original text is kept on the message for audit and debugging
//! - Messages are immutable once parsed

use crate::fields::msh;
use crate::{timestamp, Hl7Error, Hl7Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Version assumed when MSH-12 is absent.
pub const DEFAULT_VERSION: &str = "2.5";

/// Field separator used for every segment other than MSH.
pub const FIELD_SEPARATOR: char = '|';

/// Separator between components within a field.
pub const COMPONENT_SEPARATOR: char = '^';

/// One line of a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hl7Segment {
    /// Three-letter segment code, for example `PID` or `OBX`.
    pub segment_type: String,

    /// Fields addressed by HL7 position.
    ///
    /// `fields[0]` is the segment code for ordinary segments and the field separator for
    /// MSH, so `fields[n]` is always field `n` in HL7 numbering.
    pub fields: Vec<String>,
}

impl Hl7Segment {
    /// Tokenises a non-MSH line on the canonical `|` separator.
    pub fn from_line(line: &str) -> Self {
        Self {
            segment_type: line.chars().take(3).collect(),
            fields: line.split(FIELD_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// Tokenises an MSH line using the separator declared at index 3.
    fn from_msh_line(line: &str, separator: char) -> Self {
        let rest = &line[3 + separator.len_utf8()..];
        let mut fields = Vec::with_capacity(rest.matches(separator).count() + 2);
        fields.push(separator.to_string());
        fields.extend(rest.split(separator).map(str::to_string));

        Self {
            segment_type: "MSH".to_string(),
            fields,
        }
    }

    /// Returns field `position`, or `None` when it is absent or empty.
    pub fn field(&self, position: usize) -> Option<&str> {
        self.fields
            .get(position)
            .map(String::as_str)
            .filter(|f| !f.is_empty())
    }

    /// Returns the 1-based `component` of field `position`, or `None` when absent or empty.
    pub fn component(&self, position: usize, component: usize) -> Option<&str> {
        self.field(position)?
            .split(COMPONENT_SEPARATOR)
            .nth(component.checked_sub(1)?)
            .filter(|c| !c.is_empty())
    }
}

/// A fully parsed HL7 v2 message.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hl7Message {
    /// Message type from MSH-9, without the trigger event (for example `ORU`).
    pub message_type: String,
    pub version: String,
    /// Message control id from MSH-10.
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub field_separator: char,
    /// Segments in wire order; the first is always MSH.
    pub segments: Vec<Hl7Segment>,
    pub raw: String,
}

impl Hl7Message {
    /// Parses raw HL7 v2 text.
    ///
    /// Lines may be separated by CR, LF or CRLF; blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::InvalidMessage`] if:
    /// - the text contains no non-blank lines,
    /// - the first line does not start with `MSH`,
    /// - the MSH line does not declare a field separator.
    ///
    /// Malformed individual fields (for example an unreadable timestamp) never fail the parse.
    pub fn parse(raw: &str) -> Hl7Result<Self> {
        let mut lines = raw
            .split(|c| c == '\r' || c == '\n')
            .map(str::trim_end)
            .filter(|line| !line.is_empty());

        let header = lines
            .next()
            .ok_or_else(|| Hl7Error::InvalidMessage("message is empty".into()))?;

        if !header.starts_with("MSH") {
            return Err(Hl7Error::InvalidMessage(format!(
                "first segment must be MSH, found {:?}",
                header.chars().take(3).collect::<String>()
            )));
        }

        let field_separator = header[3..].chars().next().ok_or_else(|| {
            Hl7Error::InvalidMessage("MSH segment does not declare a field separator".into())
        })?;

        let msh_segment = Hl7Segment::from_msh_line(header, field_separator);

        let message_type = msh_segment
            .component(msh::MESSAGE_TYPE, 1)
            .unwrap_or_default()
            .to_string();
        let message_id = msh_segment
            .field(msh::CONTROL_ID)
            .unwrap_or_default()
            .to_string();
        let version = msh_segment
            .field(msh::VERSION)
            .unwrap_or(DEFAULT_VERSION)
            .to_string();
        let timestamp = timestamp::decode(msh_segment.field(msh::DATE_TIME).unwrap_or_default());

        let mut segments = vec![msh_segment];
        segments.extend(lines.map(Hl7Segment::from_line));

        tracing::debug!(
            message_type = %message_type,
            message_id = %message_id,
            segments = segments.len(),
            "parsed HL7 message"
        );

        Ok(Self {
            message_type,
            version,
            message_id,
            timestamp,
            field_separator,
            segments,
            raw: raw.to_string(),
        })
    }

    /// The MSH segment (always present).
    pub fn msh(&self) -> &Hl7Segment {
        &self.segments[0]
    }

    /// Returns the first segment of the given type.
    pub fn segment(&self, segment_type: &str) -> Option<&Hl7Segment> {
        self.segments
            .iter()
            .find(|s| s.segment_type == segment_type)
    }

    /// Returns every segment of the given type, in wire order.
    pub fn segments_of<'a>(
        &'a self,
        segment_type: &'a str,
    ) -> impl Iterator<Item = &'a Hl7Segment> + 'a {
        self.segments
            .iter()
            .filter(move |s| s.segment_type == segment_type)
    }

    /// Sending facility (MSH-4), if present.
    pub fn sending_facility(&self) -> Option<&str> {
        self.msh().field(msh::SENDING_FACILITY)
    }

    pub fn is_oru(&self) -> bool {
        self.message_type == "ORU"
    }

    pub fn is_orm(&self) -> bool {
        self.message_type == "ORM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = "MSH|^~\\&|LAB|CENTRAL LAB|DIALYSIS_APP|FACILITY|20240115143000||ORU^R01|CTRL-001|P|2.5\r\
PID|1||P-100^^^MRN||Doe^Jane||19700304\r\
OBR|1|ORD-1||CMP^Metabolic Panel|||20240115083000\r\
OBX|1|NM|K^Potassium||4.1|mmol/L|3.5-5.0|N\r\
OBX|2|NM|NA^Sodium||139|mmol/L|136-145|N\r";

    #[test]
    fn parses_header_metadata() {
        let message = Hl7Message::parse(SAMPLE).expect("parse sample");
        assert_eq!(message.message_type, "ORU");
        assert_eq!(message.message_id, "CTRL-001");
        assert_eq!(message.version, "2.5");
        assert_eq!(message.field_separator, '|');
        assert_eq!(
            message.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap()
        );
        assert_eq!(message.sending_facility(), Some("CENTRAL LAB"));
        assert!(message.is_oru());
        assert_eq!(message.raw, SAMPLE);
    }

    #[test]
    fn msh_fields_follow_hl7_numbering() {
        let message = Hl7Message::parse(SAMPLE).expect("parse sample");
        let msh = message.msh();
        assert_eq!(msh.segment_type, "MSH");
        assert_eq!(msh.field(1), Some("|"));
        assert_eq!(msh.field(2), Some("^~\\&"));
        assert_eq!(msh.field(3), Some("LAB"));
        assert_eq!(msh.field(9), Some("ORU^R01"));
        assert_eq!(msh.component(9, 2), Some("R01"));
    }

    #[test]
    fn keeps_segment_order() {
        let message = Hl7Message::parse(SAMPLE).expect("parse sample");
        let types: Vec<&str> = message
            .segments
            .iter()
            .map(|s| s.segment_type.as_str())
            .collect();
        assert_eq!(types, ["MSH", "PID", "OBR", "OBX", "OBX"]);

        let obx: Vec<_> = message.segments_of("OBX").collect();
        assert_eq!(obx.len(), 2);
        assert_eq!(obx[1].field(3), Some("NA^Sodium"));
    }

    #[test]
    fn accepts_lf_and_crlf_with_blank_lines() {
        let lf = SAMPLE.replace('\r', "\n");
        let crlf = SAMPLE.replace('\r', "\r\n");
        let padded = format!("\n\n{}\n\n\n", lf);

        for raw in [lf.as_str(), crlf.as_str(), padded.as_str()] {
            let message = Hl7Message::parse(raw).expect("parse variant");
            assert_eq!(message.segments.len(), 5);
            assert_eq!(message.segments[0].segment_type, "MSH");
        }
    }

    #[test]
    fn strips_trailing_whitespace_only() {
        let padded = SAMPLE.replace('\r', " \t\r");
        let message = Hl7Message::parse(&padded).expect("parse padded lines");
        let last = message.segments_of("OBX").last().expect("OBX present");
        assert_eq!(last.field(8), Some("N"));

        let indented = format!("{SAMPLE}  ZZZ|custom");
        let message = Hl7Message::parse(&indented).expect("parse indented line");
        let last = message.segments.last().expect("segments present");
        assert_eq!(last.segment_type, "  Z");
    }

    #[test]
    fn honours_declared_separator_for_msh_only() {
        let raw = "MSH#^~\\&#LAB#CENTRAL#APP#FAC#20240115##ORU^R01#X1#P#2.4\rPID|1||P-7";
        let message = Hl7Message::parse(raw).expect("parse custom separator");
        assert_eq!(message.field_separator, '#');
        assert_eq!(message.message_id, "X1");
        assert_eq!(message.version, "2.4");
        assert_eq!(message.segment("PID").and_then(|s| s.field(3)), Some("P-7"));
    }

    #[test]
    fn defaults_version_when_absent() {
        let raw = "MSH|^~\\&|LAB|CENTRAL|APP|FAC|20240115||ORU^R01|X1|P";
        let message = Hl7Message::parse(raw).expect("parse");
        assert_eq!(message.version, DEFAULT_VERSION);
    }

    #[test]
    fn rejects_empty_input() {
        for raw in ["", "\r\n\r\n", "   "] {
            let err = Hl7Message::parse(raw).expect_err("empty should fail");
            assert!(matches!(err, Hl7Error::InvalidMessage(_)), "{raw:?}");
        }
    }

    #[test]
    fn rejects_missing_msh() {
        let err = Hl7Message::parse("PID|1||P-100").expect_err("no MSH should fail");
        match err {
            Hl7Error::InvalidMessage(msg) => assert!(msg.contains("PID")),
            other => panic!("expected InvalidMessage, got {other:?}"),
        }
    }

    #[test]
    fn rejects_msh_without_separator() {
        let err = Hl7Message::parse("MSH").expect_err("bare MSH should fail");
        assert!(matches!(err, Hl7Error::InvalidMessage(_)));
    }

    #[test]
    fn first_segment_is_always_msh() {
        let inputs = [
            SAMPLE.to_string(),
            "MSH|^~\\&".to_string(),
            format!("{SAMPLE}\rZZZ|custom"),
        ];
        for raw in &inputs {
            let message = Hl7Message::parse(raw).expect("valid input");
            assert!(!message.segments.is_empty());
            assert_eq!(message.segments[0].segment_type, "MSH");
        }
    }

    #[test]
    fn empty_fields_read_as_none() {
        let segment = Hl7Segment::from_line("OBX|1||K^Potassium||");
        assert_eq!(segment.field(2), None);
        assert_eq!(segment.field(5), None);
        assert_eq!(segment.field(40), None);
        assert_eq!(segment.component(3, 2), Some("Potassium"));
    }
}
