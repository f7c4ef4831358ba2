//! Timestamp conversion between the UI and storage representations
//!
//! The UI exchanges instants as ISO-8601 strings; storage keeps them as
//! milliseconds since the Unix epoch so the column sorts numerically.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Parse an ISO-8601 timestamp into epoch milliseconds.
///
/// Accepts RFC 3339 date-times with any UTC offset and bare `YYYY-MM-DD`
/// dates (read as UTC midnight). Digits below one millisecond are dropped.
pub fn iso_to_epoch_millis(iso: &str) -> Result<i64> {
    let trimmed = iso.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.timestamp_millis());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().timestamp_millis())
            .ok_or_else(|| Error::InvalidTimestamp(iso.to_string()));
    }

    Err(Error::InvalidTimestamp(iso.to_string()))
}

/// Render epoch milliseconds as a UTC ISO-8601 string with millisecond
/// precision, e.g. `2020-01-01T00:00:00.000Z`.
pub fn epoch_millis_to_iso(millis: i64) -> Result<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| Error::InvalidTimestamp(format!("{millis} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_start_of_2020() {
        assert_eq!(
            iso_to_epoch_millis("2020-01-01T00:00:00.000Z").unwrap(),
            1_577_836_800_000
        );
        assert_eq!(
            epoch_millis_to_iso(1_577_836_800_000).unwrap(),
            "2020-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_round_trip_keeps_milliseconds() {
        let iso = "2021-06-15T08:30:12.345Z";
        let millis = iso_to_epoch_millis(iso).unwrap();
        assert_eq!(epoch_millis_to_iso(millis).unwrap(), iso);
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        let millis = iso_to_epoch_millis("2020-01-01T02:00:00+02:00").unwrap();
        assert_eq!(millis, 1_577_836_800_000);
        assert_eq!(
            epoch_millis_to_iso(millis).unwrap(),
            "2020-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_missing_fraction_is_rendered_with_millis() {
        let millis = iso_to_epoch_millis("2019-12-31T23:59:59Z").unwrap();
        assert_eq!(
            epoch_millis_to_iso(millis).unwrap(),
            "2019-12-31T23:59:59.000Z"
        );
    }

    #[test]
    fn test_sub_millisecond_digits_truncated() {
        let millis = iso_to_epoch_millis("2020-01-01T00:00:00.123456Z").unwrap();
        assert_eq!(millis, 1_577_836_800_123);
    }

    #[test]
    fn test_bare_date_is_utc_midnight() {
        assert_eq!(iso_to_epoch_millis("2020-01-01").unwrap(), 1_577_836_800_000);
    }

    #[test]
    fn test_before_epoch() {
        let millis = iso_to_epoch_millis("1969-12-31T23:59:59.999Z").unwrap();
        assert_eq!(millis, -1);
        assert_eq!(
            epoch_millis_to_iso(millis).unwrap(),
            "1969-12-31T23:59:59.999Z"
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            iso_to_epoch_millis("yesterday"),
            Err(Error::InvalidTimestamp(_))
        ));
        assert!(iso_to_epoch_millis("").is_err());
    }

    #[test]
    fn test_out_of_range_millis() {
        assert!(epoch_millis_to_iso(i64::MAX).is_err());
    }
}
