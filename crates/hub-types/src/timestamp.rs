//! Protocol timestamp encodings.
//!
//! The two message families encode instants differently:
//! - HL7 v2 uses a bare numeric form, `YYYYMMDDHHMMSS` (second precision, no zone)
//! - FHIR R4 `instant` values use ISO-8601 with millisecond precision and a `Z` suffix,
//!   e.g. `2026-01-11T14:35:22.045Z`
//!
//! All instants in the hub are UTC.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format string for the HL7 v2 `TS` data type as emitted by the hub.
pub const HL7_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Formats `instant` as an HL7 v2 timestamp (`YYYYMMDDHHMMSS`).
pub fn hl7_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(HL7_TIMESTAMP_FORMAT).to_string()
}

/// Formats `instant` as a FHIR `instant` with millisecond precision.
pub fn fhir_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a FHIR `instant` (any RFC 3339 offset is accepted and normalised to UTC).
pub fn parse_fhir_instant(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone};

    fn parse_hl7_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        let naive = NaiveDateTime::parse_from_str(text, HL7_TIMESTAMP_FORMAT)?;
        Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 11, 14, 35, 22).unwrap()
            + chrono::Duration::milliseconds(45)
    }

    #[test]
    fn hl7_timestamp_is_fourteen_digits() {
        let ts = hl7_timestamp(sample());
        assert_eq!(ts, "20260111143522");
        assert_eq!(ts.len(), 14);
        assert!(ts.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn fhir_instant_keeps_milliseconds_and_zulu() {
        assert_eq!(fhir_instant(sample()), "2026-01-11T14:35:22.045Z");
    }

    #[test]
    fn parses_both_encodings_back() {
        let hl7 = parse_hl7_timestamp("20260111143522").expect("hl7 ts");
        assert_eq!(hl7, Utc.with_ymd_and_hms(2026, 1, 11, 14, 35, 22).unwrap());

        let fhir = parse_fhir_instant("2026-01-11T14:35:22.045Z").expect("fhir instant");
        assert_eq!(fhir, sample());

        let offset = parse_fhir_instant("2026-01-11T15:35:22.045+01:00").expect("offset");
        assert_eq!(offset, sample());
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(parse_hl7_timestamp("2026-01-11").is_err());
        assert!(parse_fhir_instant("20260111143522").is_err());
    }
}
