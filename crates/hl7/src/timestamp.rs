//! Compact HL7 timestamp codec (`YYYYMMDD[HHMM[SS]]`).
//!
//! Wire timestamps carry no zone here and are read as UTC. Anything after the seconds group
//! (fractional seconds, `+ZZZZ` offsets) is ignored.

use crate::{Hl7Error, Hl7Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

/// Output format of [`encode`]: 14 digits, no separators.
pub const HL7_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Minimum length of a usable timestamp (the date part).
const MIN_TIMESTAMP_LEN: usize = 8;

/// Years expressible in the four-digit wire form.
const WIRE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Encoding of any instant before year 0000.
pub const EARLIEST_ENCODED: &str = "00000101000000";

/// Encoding of any instant after year 9999.
pub const LATEST_ENCODED: &str = "99991231235959";

/// Decodes an HL7 timestamp, falling back to the current time.
///
/// Empty or short (< 8 characters) input yields `Utc::now()`, as does any value that
/// [`decode_strict`] rejects. An absent or unreadable timestamp must never fail ingestion of
/// an otherwise valid message.
pub fn decode(value: &str) -> DateTime<Utc> {
    let value = value.trim();
    if value.len() < MIN_TIMESTAMP_LEN {
        return Utc::now();
    }

    match decode_strict(value) {
        Ok(timestamp) => timestamp,
        Err(err) => {
            tracing::debug!("{err}; using current time");
            Utc::now()
        }
    }
}

/// Decodes an HL7 timestamp, reporting malformed input.
///
/// Missing hour, minute or second groups default to zero.
///
/// # Errors
///
/// Returns [`Hl7Error::MalformedField`] if the value has fewer than 8 leading digits or
/// does not describe a real calendar date and time.
pub fn decode_strict(value: &str) -> Hl7Result<DateTime<Utc>> {
    let malformed = || Hl7Error::MalformedField {
        field: "timestamp",
        value: value.to_string(),
    };

    let value = value.trim();
    let digit_count = value.bytes().take_while(u8::is_ascii_digit).count();
    let digits = &value[..digit_count];
    if digits.len() < MIN_TIMESTAMP_LEN {
        return Err(malformed());
    }

    // A group past the end of the digits is absent and reads as zero.
    let group = |start: usize, end: usize| -> u32 {
        digits
            .get(start..end.min(digits.len()))
            .filter(|g| !g.is_empty())
            .and_then(|g| g.parse().ok())
            .unwrap_or(0)
    };

    let year = digits[0..4].parse::<i32>().map_err(|_| malformed())?;
    let month = group(4, 6);
    let day = group(6, 8);
    let hour = group(8, 10);
    let minute = group(10, 12);
    let second = group(12, 14);

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(malformed)?;

    Ok(Utc.from_utc_datetime(&naive))
}

/// Encodes a timestamp as `YYYYMMDDHHMMSS`.
///
/// Sub-second precision is dropped. The output is always 14 digits: instants outside years
/// 0000-9999 are clamped to the nearest representable second and logged.
pub fn encode(timestamp: &DateTime<Utc>) -> String {
    let year = timestamp.year();
    if WIRE_YEARS.contains(&year) {
        return timestamp.format(HL7_TIMESTAMP_FORMAT).to_string();
    }

    tracing::warn!(year, "timestamp outside the four-digit year range; clamped");
    if year < *WIRE_YEARS.start() {
        EARLIEST_ENCODED.to_string()
    } else {
        LATEST_ENCODED.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};
    use proptest::prelude::*;

    /// Unix seconds of 0000-01-01T00:00:00Z and 9999-12-31T23:59:59Z.
    const FIRST_WIRE_SECOND: i64 = -62_167_219_200;
    const LAST_WIRE_SECOND: i64 = 253_402_300_799;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn decodes_full_precision() {
        assert_eq!(decode("20240115143022"), at(2024, 1, 15, 14, 30, 22));
    }

    #[test]
    fn missing_time_groups_default_to_zero() {
        assert_eq!(decode("20240115"), at(2024, 1, 15, 0, 0, 0));
        assert_eq!(decode("202401151430"), at(2024, 1, 15, 14, 30, 0));
        assert_eq!(decode("2024011514"), at(2024, 1, 15, 14, 0, 0));
    }

    #[test]
    fn month_is_one_based_on_the_wire() {
        assert_eq!(decode("20241231").format("%m").to_string(), "12");
        assert_eq!(decode("20240101").format("%m").to_string(), "01");
    }

    #[test]
    fn ignores_fraction_and_offset() {
        assert_eq!(
            decode("20240115143022.1234-0500"),
            at(2024, 1, 15, 14, 30, 22)
        );
    }

    #[test]
    fn short_or_empty_input_falls_back_to_now() {
        for input in ["", "2024", "2024011"] {
            let before = Utc::now() - Duration::seconds(1);
            let decoded = decode(input);
            assert!(decoded >= before, "{input:?} should decode to now");
        }
    }

    #[test]
    fn malformed_input_falls_back_to_now_but_strict_reports_it() {
        let before = Utc::now() - Duration::seconds(1);
        assert!(decode("20241345") >= before);
        assert!(decode("2024-01-15") >= before);

        let err = decode_strict("20241345").expect_err("month 13 is invalid");
        match err {
            Hl7Error::MalformedField { field, value } => {
                assert_eq!(field, "timestamp");
                assert_eq!(value, "20241345");
            }
            other => panic!("expected MalformedField, got {other:?}"),
        }
    }

    #[test]
    fn encodes_fourteen_digits() {
        let encoded = encode(&at(2024, 3, 7, 9, 5, 1));
        assert_eq!(encoded, "20240307090501");
        assert_eq!(encoded.len(), 14);
    }

    #[test]
    fn round_trips_second_precision_timestamps() {
        let samples = [
            at(2024, 1, 15, 14, 30, 22),
            at(1999, 12, 31, 23, 59, 59),
            at(2000, 2, 29, 0, 0, 0),
            Utc::now().with_nanosecond(0).unwrap(),
            at(0, 1, 1, 0, 0, 0),
            at(9999, 12, 31, 23, 59, 59),
        ];
        for t in samples {
            assert_eq!(decode(&encode(&t)), t);
        }
    }

    #[test]
    fn out_of_range_years_are_clamped() {
        assert_eq!(encode(&at(10000, 6, 1, 12, 0, 0)), LATEST_ENCODED);
        assert_eq!(encode(&at(-1, 6, 1, 12, 0, 0)), EARLIEST_ENCODED);

        assert_eq!(
            decode(&encode(&at(10000, 6, 1, 12, 0, 0))),
            at(9999, 12, 31, 23, 59, 59)
        );
        assert_eq!(
            decode(&encode(&at(-1, 6, 1, 12, 0, 0))),
            at(0, 1, 1, 0, 0, 0)
        );
    }

    proptest! {
        #[test]
        fn round_trip_holds_across_wire_range(secs in FIRST_WIRE_SECOND..=LAST_WIRE_SECOND) {
            let t = DateTime::from_timestamp(secs, 0).expect("in chrono range");
            prop_assert_eq!(decode_strict(&encode(&t)).expect("strict decode"), t);
        }

        #[test]
        fn encoding_is_always_fourteen_digits(
            secs in -8_000_000_000_000i64..=8_000_000_000_000i64,
            nanos in 0u32..1_000_000_000,
        ) {
            let t = DateTime::from_timestamp(secs, nanos).expect("in chrono range");
            let encoded = encode(&t);
            prop_assert_eq!(encoded.len(), 14);
            prop_assert!(encoded.bytes().all(|b| b.is_ascii_digit()), "{}", encoded);
            prop_assert!(decode_strict(&encoded).is_ok());
        }
    }
}
