//! Lenient parsing of form date fields.
//!
//! Date pickers in the intake UI emit ISO dates (`2021-04-01`), but rows
//! hydrated from older submissions may carry `DD-MM-YYYY`, `DD/MM/YYYY` or a
//! full RFC 3339 timestamp. All of them normalise to midnight UTC (or the
//! given instant for RFC 3339).

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::Timestamp;

/// Date-only formats accepted, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// The state of a single date field on a form entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// Field is missing or blank.
    Absent,
    /// Field holds something that is not a recognisable date.
    Invalid,
    /// Field parsed successfully.
    Valid(Timestamp),
}

impl DateValue {
    /// The parsed timestamp, if any.
    pub fn timestamp(self) -> Option<Timestamp> {
        match self {
            Self::Valid(ts) => Some(ts),
            _ => None,
        }
    }
}

/// Parse a raw form value into a UTC timestamp.
///
/// Returns `None` for blank or unrecognised input.
pub fn parse_form_date(raw: &str) -> Option<Timestamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Classify an optional raw form value.
pub fn classify_date(raw: Option<&str>) -> DateValue {
    match raw.map(str::trim) {
        None | Some("") => DateValue::Absent,
        Some(value) => match parse_form_date(value) {
            Some(ts) => DateValue::Valid(ts),
            None => DateValue::Invalid,
        },
    }
}

/// Format a timestamp the way error messages show dates (`DD-MM-YYYY`).
pub fn display_date(ts: Timestamp) -> String {
    ts.format("%d-%m-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_iso_date() {
        let ts = parse_form_date("2021-04-01").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2021, 4, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_day_first_formats() {
        let expected = Utc.with_ymd_and_hms(2019, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(parse_form_date("31-12-2019"), Some(expected));
        assert_eq!(parse_form_date("31/12/2019"), Some(expected));
    }

    #[test]
    fn parses_rfc3339() {
        let ts = parse_form_date("2020-06-15T10:30:00+05:30").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2020, 6, 15, 5, 0, 0).unwrap());
    }

    #[test]
    fn blank_and_garbage_are_rejected() {
        assert_eq!(parse_form_date(""), None);
        assert_eq!(parse_form_date("   "), None);
        assert_eq!(parse_form_date("yesterday"), None);
        assert_eq!(parse_form_date("2021-13-01"), None);
    }

    #[test]
    fn classify_distinguishes_absent_from_invalid() {
        assert_eq!(classify_date(None), DateValue::Absent);
        assert_eq!(classify_date(Some(" ")), DateValue::Absent);
        assert_eq!(classify_date(Some("not a date")), DateValue::Invalid);
        assert!(classify_date(Some("2020-01-01")).timestamp().is_some());
    }

    #[test]
    fn display_is_day_first() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(display_date(ts), "05-01-2020");
    }
}
